use std::{collections::HashMap, fs};

use client_core::navigation::DEFAULT_ROUTE_PREFIX;

const CONFIG_FILE: &str = "pokedex.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub collection: String,
    pub route_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "https://pokeapi.co/api/v2".into(),
            collection: "pokemon".into(),
            route_prefix: DEFAULT_ROUTE_PREFIX.into(),
        }
    }
}

impl Settings {
    /// Command-line flags win over everything else.
    pub fn apply_overrides(
        &mut self,
        api_url: Option<String>,
        collection: Option<String>,
        route_prefix: Option<String>,
    ) {
        if let Some(v) = api_url {
            self.api_url = v;
        }
        if let Some(v) = collection {
            self.collection = v;
        }
        if let Some(v) = route_prefix {
            self.route_prefix = v;
        }
    }
}

pub fn load_settings() -> Settings {
    let file_contents = fs::read_to_string(CONFIG_FILE).ok();
    resolve_settings(file_contents.as_deref(), |key| std::env::var(key).ok())
}

/// Defaults, then the config file, then environment variables.
fn resolve_settings(
    file_contents: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file_contents {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) {
            if let Some(v) = file_cfg.get("api_url") {
                settings.api_url = v.clone();
            }
            if let Some(v) = file_cfg.get("collection") {
                settings.collection = v.clone();
            }
            if let Some(v) = file_cfg.get("route_prefix") {
                settings.route_prefix = v.clone();
            }
        }
    }

    if let Some(v) = env("POKEDEX_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = env("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = env("POKEDEX_COLLECTION") {
        settings.collection = v;
    }
    if let Some(v) = env("APP__COLLECTION") {
        settings.collection = v;
    }

    if let Some(v) = env("POKEDEX_ROUTE_PREFIX") {
        settings.route_prefix = v;
    }
    if let Some(v) = env("APP__ROUTE_PREFIX") {
        settings.route_prefix = v;
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
