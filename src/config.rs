//! Configuration loading helpers.

use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::cache::CacheConfig;

/// Errors returned by configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error while reading config files.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// Invalid value for a key.
    #[error("invalid value for {key}: {value}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Raw value string.
        value: String,
    },
    /// Unknown configuration key.
    #[error("unknown config key: {0}")]
    UnknownKey(String),
}

/// Top-level configuration schema.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CycledbConfig {
    /// Cache configuration.
    pub cache: Option<CacheConfigSpec>,
}

impl CycledbConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Load configuration from the `CYCLEDB_CONFIG` env var (if set), then
    /// apply `CYCLEDB__cache__field` overrides.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let config_path = env::var("CYCLEDB_CONFIG").ok();
        let mut config = match config_path {
            Some(path) => Self::load_from_path(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment overrides in-place.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        for (key, value) in env::vars() {
            if !key.starts_with("CYCLEDB__") {
                continue;
            }
            let path = key["CYCLEDB__".len()..].to_ascii_lowercase();
            let parts: Vec<&str> = path.split("__").collect();
            let value = value.trim().to_string();

            match parts.as_slice() {
                ["cache", "root"] => {
                    self.cache_mut().root = Some(value);
                }
                ["cache", "min_rings"] => {
                    self.cache_mut().min_rings = Some(parse_value(&key, &value)?);
                }
                ["cache", "promotion_backlog"] => {
                    self.cache_mut().promotion_backlog = Some(parse_value(&key, &value)?);
                }
                ["cache", "max_batch_size"] => {
                    self.cache_mut().max_batch_size = Some(parse_value(&key, &value)?);
                }
                ["cache", "read_only"] => {
                    self.cache_mut().read_only = Some(parse_value(&key, &value)?);
                }
                _ => return Err(ConfigError::UnknownKey(key)),
            }
        }

        Ok(())
    }

    /// Build a [`CacheConfig`] using defaults plus overrides.
    pub fn to_cache_config(&self) -> CacheConfig {
        let mut config = CacheConfig::default();
        if let Some(cache) = &self.cache {
            cache.apply_to(&mut config);
        }
        config
    }

    fn cache_mut(&mut self) -> &mut CacheConfigSpec {
        self.cache.get_or_insert_with(CacheConfigSpec::default)
    }
}

/// Cache configuration overrides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheConfigSpec {
    /// Ring namespace.
    pub root: Option<String>,
    /// Minimum ring count preserved by rotation.
    pub min_rings: Option<usize>,
    /// Promotion queue capacity.
    pub promotion_backlog: Option<usize>,
    /// Per-transaction promotion batch cap.
    pub max_batch_size: Option<usize>,
    /// Read-only mode.
    pub read_only: Option<bool>,
}

impl CacheConfigSpec {
    fn apply_to(&self, config: &mut CacheConfig) {
        if let Some(value) = &self.root {
            config.root = value.clone();
        }
        if let Some(value) = self.min_rings {
            config.min_rings = value;
        }
        if let Some(value) = self.promotion_backlog {
            config.promotion_backlog = value;
        }
        if let Some(value) = self.max_batch_size {
            config.max_batch_size = value;
        }
        if let Some(value) = self.read_only {
            config.read_only = value;
        }
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
