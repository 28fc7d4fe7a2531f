use std::{env, path::PathBuf};

pub const DEFAULT_PAYMENT_METHODS: [&str; 2] = ["PayPal", "Stripe"];

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub catalog_url: String,
    pub store_path: PathBuf,
    pub payment_methods: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            catalog_url: "http://127.0.0.1:3000".to_string(),
            store_path: PathBuf::from(".storefront/local-storage.json"),
            payment_methods: DEFAULT_PAYMENT_METHODS.map(String::from).to_vec(),
        }
    }
}

impl ClientConfig {
    /// Reads `CATALOG_URL`, `STORE_PATH` and `PAYMENT_METHODS`, keeping the
    /// default for anything unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let catalog_url = lookup("CATALOG_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(defaults.catalog_url);
        let store_path = lookup("STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.store_path);
        let payment_methods = lookup("PAYMENT_METHODS")
            .map(|raw| parse_list(&raw))
            .filter(|methods| !methods.is_empty())
            .unwrap_or(defaults.payment_methods);
        Self {
            catalog_url,
            store_path,
            payment_methods,
        }
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
