//! `idmapdb` Configuration Module
//!
//! Provides configuration file support via `idmapdb.toml`, environment
//! variables, and runtime overrides.
//!
//! # Priority (highest to lowest)
//!
//! 1. Environment variables (`IDMAPDB_*`)
//! 2. Configuration file (`idmapdb.toml`)
//! 3. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to parse configuration file.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue {
        /// Configuration key that failed validation.
        key: String,
        /// Validation error message.
        message: String,
    },
}

/// Storage configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Data directory path.
    pub data_dir: String,
    /// Index snapshot file name inside the data directory.
    pub index_file: String,
    /// Mapper file name inside the data directory.
    pub mapper_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./idmapdb_data".to_string(),
            index_file: "vectors.index".to_string(),
            mapper_file: "payloads.json".to_string(),
        }
    }
}

/// Search configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of results a search returns when the caller has no opinion.
    pub default_results: usize,
    /// Upper bound accepted for a single search.
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_results: crate::index::DEFAULT_N_RESULTS,
            max_results: 1000,
        }
    }
}

/// Logging configuration section.
///
/// Consumed by embedding applications when they install a `tracing`
/// subscriber; the library itself only emits events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace.
    pub level: String,
    /// Log format: text or json.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Main `idmapdb` configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Search configuration.
    pub search: SearchConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl StoreConfig {
    /// Loads configuration from default sources.
    ///
    /// Priority: defaults < `idmapdb.toml` < environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("idmapdb.toml")
    }

    /// Loads configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("IDMAPDB_").split("_").lowercase(false));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Creates a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::string(toml_str));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.default_results == 0 || self.search.default_results > self.search.max_results
        {
            return Err(ConfigError::InvalidValue {
                key: "search.default_results".to_string(),
                message: format!(
                    "value {} is out of range [1, {}]",
                    self.search.default_results, self.search.max_results
                ),
            });
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.level".to_string(),
                message: format!(
                    "value '{}' is invalid, expected one of: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.format".to_string(),
                message: format!(
                    "value '{}' is invalid, expected one of: {:?}",
                    self.logging.format, valid_formats
                ),
            });
        }

        Ok(())
    }

    /// Full path of the index snapshot file.
    #[must_use]
    pub fn index_path(&self) -> PathBuf {
        Path::new(&self.storage.data_dir).join(&self.storage.index_file)
    }

    /// Full path of the mapper file.
    #[must_use]
    pub fn mapper_path(&self) -> PathBuf {
        Path::new(&self.storage.data_dir).join(&self.storage.mapper_file)
    }

    /// Serializes the configuration to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}
