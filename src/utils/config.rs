// src/utils/config.rs
//! Probe engine configuration
//!
//! Values are layered from defaults, an optional config file and
//! `CALL_PROBES__*` environment variables. The set of observed call shapes is
//! fixed and intentionally absent from here.

use crate::utils::errors::{ProbeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "CALL_PROBES";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub registry: RegistryConfig,
    pub logging: LoggingConfig,
    pub sink: SinkConfig,
}

/// Statement registry tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Sweep dead entries after this many successful inserts
    pub sweep_interval: usize,

    /// Pre-allocated entry capacity
    pub initial_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            sweep_interval: 1024,
            initial_capacity: 256,
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,

    /// Emit JSON lines instead of the compact formatter
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// In-memory sink settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Rows reserved per table up front
    pub initial_rows_per_table: usize,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            initial_rows_per_table: 1024,
        }
    }
}

impl ProbeConfig {
    /// Load configuration from environment variables only
    pub fn load() -> Result<Self> {
        Self::load_layered(None, ENV_PREFIX)
    }

    /// Load configuration from a file, with environment overrides on top
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_layered(Some(path.as_ref()), ENV_PREFIX)
    }

    fn load_layered(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(env_prefix)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: ProbeConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.registry.sweep_interval == 0 {
            return Err(ProbeError::ConfigError(
                "registry.sweep_interval must be greater than 0".to_string(),
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ProbeError::ConfigError(
                "logging.level cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = ProbeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.registry.sweep_interval, 1024);
        assert!(!config.logging.json);
    }

    #[test]
    fn test_zero_sweep_interval_rejected() {
        let mut config = ProbeConfig::default();
        config.registry.sweep_interval = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[registry]\nsweep_interval = 16\n\n[logging]\nlevel = \"debug\"\njson = true"
        )
        .unwrap();

        let config = ProbeConfig::load_layered(Some(file.path()), "CALL_PROBES_TEST_FILE").unwrap();
        assert_eq!(config.registry.sweep_interval, 16);
        assert_eq!(config.registry.initial_capacity, 256);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_env_override() {
        std::env::set_var("CALL_PROBES_TEST_ENV__REGISTRY__SWEEP_INTERVAL", "7");
        let config = ProbeConfig::load_layered(None, "CALL_PROBES_TEST_ENV").unwrap();
        std::env::remove_var("CALL_PROBES_TEST_ENV__REGISTRY__SWEEP_INTERVAL");

        assert_eq!(config.registry.sweep_interval, 7);
    }

    #[test]
    fn test_invalid_file_value_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[registry]\nsweep_interval = 0").unwrap();

        let result = ProbeConfig::load_layered(Some(file.path()), "CALL_PROBES_TEST_INVALID");
        assert!(matches!(result, Err(ProbeError::ConfigError(_))));
    }
}
