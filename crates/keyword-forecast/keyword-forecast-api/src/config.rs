//! Engine configuration.
//!
//! Resolution order: built-in defaults, then an optional JSON file, then
//! `KWF_*` environment variables.

use std::path::{Path, PathBuf};

use keyword_forecast_core::{CacheConfig, EstimatorConfig, VarianceTable, DEFAULT_TOP_N};
use keyword_forecast_spi::ForecastError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const ENV_CACHE_ENABLED: &str = "KWF_CACHE_ENABLED";
pub const ENV_CACHE_CAPACITY: &str = "KWF_CACHE_CAPACITY";
pub const ENV_CACHE_TTL_MS: &str = "KWF_CACHE_TTL_MS";
pub const ENV_CONCURRENCY: &str = "KWF_CONCURRENCY";
pub const ENV_DEFAULT_TOP_N: &str = "KWF_DEFAULT_TOP_N";

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for {key}: '{value}'")]
    Env { key: String, value: String },

    #[error(transparent)]
    Invalid(#[from] ForecastError),
}

/// Process-wide engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub estimator: EstimatorConfig,
    pub variance: VarianceTable,
    pub cache: CacheConfig,
    /// Estimation workers: 0 uses rayon's global pool, 1 runs inline
    pub concurrency: usize,
    /// Ranking length when the caller gives none
    pub default_top_n: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            estimator: EstimatorConfig::default(),
            variance: VarianceTable::default(),
            cache: CacheConfig::default(),
            concurrency: 0,
            default_top_n: DEFAULT_TOP_N,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded engine config");
        Self::from_json_str(&json)
    }

    /// Defaults, overlaid by `path` when given, overlaid by the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };
        let config = config.with_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `KWF_*` overrides read through `lookup`.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_CACHE_ENABLED) {
            self.cache.enabled = parse_bool(ENV_CACHE_ENABLED, &value)?;
        }
        if let Some(value) = lookup(ENV_CACHE_CAPACITY) {
            self.cache.capacity = parse_number(ENV_CACHE_CAPACITY, &value)?;
        }
        if let Some(value) = lookup(ENV_CACHE_TTL_MS) {
            self.cache.ttl_ms = parse_number(ENV_CACHE_TTL_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_CONCURRENCY) {
            self.concurrency = parse_number(ENV_CONCURRENCY, &value)?;
        }
        if let Some(value) = lookup(ENV_DEFAULT_TOP_N) {
            self.default_top_n = parse_number(ENV_DEFAULT_TOP_N, &value)?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.estimator.validate()?;
        self.variance.validate()?;
        self.cache.validate()?;
        if self.default_top_n == 0 {
            return Err(ForecastError::InvalidConfig("default_top_n must be at least 1".to_string()).into());
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Env {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
