use shared::domain::ItemId;

pub const DEFAULT_ROUTE_PREFIX: &str = "/pokedex";

/// Router collaborator. The coordinator asks it to show an item's detail
/// route whenever the user selects an item.
pub trait Navigator: Send + Sync {
    fn navigate_to_item(&self, item_id: ItemId);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate_to_item(&self, _item_id: ItemId) {}
}

/// Extracts the item identifier from a navigation target such as
/// `/pokedex/45`. Only a single positive integer segment directly under the
/// route prefix counts; anything else is not a deep link.
pub fn parse_deep_link(path: &str, route_prefix: &str) -> Option<ItemId> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let prefix = route_prefix.trim_end_matches('/');
    let rest = path.strip_prefix(prefix)?;
    if !rest.is_empty() && !rest.starts_with('/') {
        return None;
    }

    let segment = rest.trim_matches('/');
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    segment.parse::<u32>().ok().filter(|id| *id > 0).map(ItemId)
}

pub fn item_path(route_prefix: &str, item_id: ItemId) -> String {
    format!("{}/{item_id}", route_prefix.trim_end_matches('/'))
}

#[cfg(test)]
#[path = "tests/navigation_tests.rs"]
mod tests;
