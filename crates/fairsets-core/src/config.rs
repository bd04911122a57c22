//! Fetch configuration.
//!
//! [`FetchConfig`] is passed explicitly to the fetcher; nothing in the library
//! derives a cache location on its own. Files use TOML:
//!
//! ```toml
//! data_home    = "/var/cache/fairsets"
//! cache        = true
//! timeout_secs = 60
//! retries      = 1
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, Result};

pub const DATA_HOME_ENV: &str = "FAIRSETS_DATA_HOME";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Directory holding cached downloads and local dataset files.
    pub data_home: PathBuf,
    #[serde(default = "default_cache")]
    pub cache: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra attempts after a failed remote retrieval.
    #[serde(default = "default_retries")]
    pub retries: u32,
}

fn default_cache() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_retries() -> u32 {
    1
}

impl FetchConfig {
    pub fn new(data_home: impl Into<PathBuf>) -> Self {
        Self {
            data_home: data_home.into(),
            cache: default_cache(),
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
        }
    }

    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|err| DatasetError::Config(err.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|err| {
            DatasetError::Config(format!("failed to read {}: {err}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_fills_defaults() {
        let config = FetchConfig::from_toml_str(r#"data_home = "/tmp/fairsets""#).unwrap();
        assert_eq!(config, FetchConfig::new("/tmp/fairsets"));
        assert!(config.cache);
        assert_eq!(config.retries, 1);
    }

    #[test]
    fn toml_overrides_values() {
        let config = FetchConfig::from_toml_str(
            r#"
            data_home = "data"
            cache = false
            timeout_secs = 5
            retries = 0
            "#,
        )
        .unwrap();
        assert!(!config.cache);
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.retries, 0);
    }

    #[test]
    fn missing_data_home_is_a_config_error() {
        let err = FetchConfig::from_toml_str("cache = true").unwrap_err();
        assert!(matches!(err, DatasetError::Config(_)));
    }
}
