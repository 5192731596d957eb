//! Scripted navigation actions replayed by the CLI after startup.

use std::str::FromStr;

use shared::domain::ItemId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Next,
    Previous,
    Select(ItemId),
}

impl FromStr for Action {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        match raw.to_ascii_lowercase().as_str() {
            "next" | "n" => return Ok(Self::Next),
            "prev" | "previous" | "p" => return Ok(Self::Previous),
            _ => {}
        }

        let Some(id) = raw.strip_prefix("select=") else {
            return Err(format!(
                "unknown action '{raw}'; expected next, prev or select=<id>"
            ));
        };
        id.parse::<u32>()
            .ok()
            .filter(|id| *id > 0)
            .map(|id| Self::Select(ItemId(id)))
            .ok_or_else(|| format!("invalid item id in '{raw}'"))
    }
}

#[cfg(test)]
#[path = "tests/script_tests.rs"]
mod tests;
