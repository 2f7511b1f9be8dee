//! # Configuration
//!
//! Loaded once at startup from JSON. Every field has a default, so an empty
//! object (`{}`) is a valid configuration.
//!
//! ```json
//! {
//!   "mode": "public",
//!   "base_dn": "o=smartdc",
//!   "cache": { "size": 1000, "expiry": 300 }
//! }
//! ```

use dir_model::{Dn, ModelError};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid base_dn: {0}")]
    BaseDn(ModelError),
}

/// Deployment mode. Decides who may write and delete images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// A public registry: only operators may modify images.
    Public,
    /// A private registry: any authenticated caller may publish.
    Private,
    /// A registry inside a single datacenter.
    #[default]
    Dc,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Public => write!(f, "public"),
            Mode::Private => write!(f, "private"),
            Mode::Dc => write!(f, "dc"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum entries per cache scope.
    pub size: usize,
    /// Entry lifetime in seconds.
    pub expiry: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            size: 1000,
            expiry: 300,
        }
    }
}

impl CacheConfig {
    pub fn expiry(&self) -> Duration {
        Duration::from_secs(self.expiry)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mode: Mode,
    pub base_dn: String,
    pub cache: CacheConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            base_dn: "o=smartdc".to_string(),
            cache: CacheConfig::default(),
        }
    }
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.base_dn()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn base_dn(&self) -> Result<Dn, ConfigError> {
        Dn::parse(&self.base_dn).map_err(ConfigError::BaseDn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_json_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.mode, Mode::Dc);
        assert_eq!(config.cache.expiry(), Duration::from_secs(300));
    }

    #[test]
    fn test_partial_override() {
        let config =
            Config::from_json_str(r#"{"mode": "public", "cache": {"size": 10}}"#).unwrap();
        assert_eq!(config.mode, Mode::Public);
        assert_eq!(config.cache.size, 10);
        assert_eq!(config.cache.expiry, 300);
        assert_eq!(config.base_dn, "o=smartdc");
    }

    #[test]
    fn test_rejects_unknown_mode_and_bad_base_dn() {
        assert!(matches!(
            Config::from_json_str(r#"{"mode": "hybrid"}"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            Config::from_json_str(r#"{"base_dn": "not a dn"}"#),
            Err(ConfigError::BaseDn(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Config::from_file("/nonexistent/registry.json"),
            Err(ConfigError::Io { .. })
        ));
    }
}
