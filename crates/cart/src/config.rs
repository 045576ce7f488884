//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `GO_MARKET_CART_KEY` - Storage key the cart is persisted under (default: `@GoMarket:cart`)
//! - `GO_MARKET_DATA_DIR` - Directory for the file storage backend (default: `.go-market`)

use std::path::PathBuf;

use thiserror::Error;

/// Storage key used when `GO_MARKET_CART_KEY` is unset.
pub const DEFAULT_CART_KEY: &str = "@GoMarket:cart";

/// Data directory used when `GO_MARKET_DATA_DIR` is unset.
pub const DEFAULT_DATA_DIR: &str = ".go-market";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Key the serialized cart lives under
    pub storage_key: String,
    /// Directory holding the file backend's data
    pub data_dir: PathBuf,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_CART_KEY.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let storage_key = non_blank(&lookup, "GO_MARKET_CART_KEY", DEFAULT_CART_KEY)?;
        let data_dir = non_blank(&lookup, "GO_MARKET_DATA_DIR", DEFAULT_DATA_DIR)?;

        Ok(Self {
            storage_key,
            data_dir: PathBuf::from(data_dir),
        })
    }

    /// Path of the JSON file used by the file backend.
    #[must_use]
    pub fn storage_file(&self) -> PathBuf {
        self.data_dir.join("storage.json")
    }
}

fn non_blank(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: &str,
) -> Result<String, ConfigError> {
    match lookup(name) {
        None => Ok(default.to_string()),
        Some(value) if value.trim().is_empty() => Err(ConfigError::InvalidEnvVar(
            name.to_string(),
            "must not be empty".to_string(),
        )),
        Some(value) => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = CartConfig::from_lookup(lookup_from(&[])).expect("defaults");
        assert_eq!(config, CartConfig::default());
        assert_eq!(config.storage_key, "@GoMarket:cart");
        assert_eq!(config.storage_file(), PathBuf::from(".go-market/storage.json"));
    }

    #[test]
    fn test_overrides() {
        let config = CartConfig::from_lookup(lookup_from(&[
            ("GO_MARKET_CART_KEY", "@Test:cart"),
            ("GO_MARKET_DATA_DIR", "/tmp/gm"),
        ]))
        .expect("valid");
        assert_eq!(config.storage_key, "@Test:cart");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/gm"));
    }

    #[test]
    fn test_blank_values_rejected() {
        let err = CartConfig::from_lookup(lookup_from(&[("GO_MARKET_CART_KEY", "  ")]))
            .expect_err("blank key");
        assert!(err.to_string().contains("GO_MARKET_CART_KEY"));
    }
}
