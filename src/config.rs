use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::store::CART_KEY;

/// Runtime settings, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct CartConfig {
    pub catalog_url: String,
    pub data_dir: String,
    pub storage_key: String,
    pub channel_capacity: usize,
    pub request_timeout: Option<Duration>,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            catalog_url: Self::DEFAULT_CATALOG_URL.to_string(),
            data_dir: Self::DEFAULT_DATA_DIR.to_string(),
            storage_key: CART_KEY.to_string(),
            channel_capacity: Self::DEFAULT_CHANNEL_CAPACITY,
            request_timeout: None,
        }
    }
}

impl CartConfig {
    const DEFAULT_CATALOG_URL: &'static str = "http://localhost:3333";
    const DEFAULT_DATA_DIR: &'static str = "./data";
    const DEFAULT_CHANNEL_CAPACITY: usize = 100;

    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the config from a variable lookup. Missing or unparsable values
    /// fall back to the defaults.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            catalog_url: lookup("CART_CATALOG_URL").unwrap_or(defaults.catalog_url),
            data_dir: lookup("CART_DATA_DIR").unwrap_or(defaults.data_dir),
            storage_key: lookup("CART_STORAGE_KEY").unwrap_or(defaults.storage_key),
            channel_capacity: parse_var(&lookup, "CART_CHANNEL_CAPACITY")
                .filter(|capacity: &usize| *capacity > 0)
                .unwrap_or(defaults.channel_capacity),
            request_timeout: parse_var(&lookup, "CART_REQUEST_TIMEOUT_SECS")
                .map(Duration::from_secs),
        }
    }

    /// Location of the sled database holding the cart snapshot.
    pub fn store_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("cart.sled")
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparsable setting");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_unset() {
        let config = CartConfig::from_vars(|_| None);
        assert_eq!(config, CartConfig::default());
        assert_eq!(config.storage_key, "@RocketShoes:cart");
        assert_eq!(config.store_path(), PathBuf::from("./data").join("cart.sled"));
    }

    #[test]
    fn test_reads_and_validates_overrides() {
        let vars = HashMap::from([
            ("CART_CATALOG_URL", "http://api.local:8080"),
            ("CART_CHANNEL_CAPACITY", "0"),
            ("CART_REQUEST_TIMEOUT_SECS", "5"),
            ("CART_DATA_DIR", "/tmp/cart"),
        ]);
        let config = CartConfig::from_vars(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.catalog_url, "http://api.local:8080");
        assert_eq!(config.channel_capacity, 100);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.data_dir, "/tmp/cart");

        let config = CartConfig::from_vars(|key| {
            (key == "CART_REQUEST_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert_eq!(config.request_timeout, None);
    }
}
