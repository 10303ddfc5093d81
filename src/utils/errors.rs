// src/utils/errors.rs
//! Error types for the probe engine
//!
//! None of these cross a hook boundary: the recorder logs and swallows them
//! so the instrumented call is never disturbed.

use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, ProbeError>;

/// Probe engine errors
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Row {row} is not open in table '{table}'")]
    RowNotOpen { table: &'static str, row: usize },

    #[error("Unknown column '{column}' for table '{table}'")]
    UnknownColumn { table: &'static str, column: String },

    #[error("Invalid method signature '{pattern}': {reason}")]
    InvalidSignature { pattern: String, reason: String },

    #[error("Sink failure: {0}")]
    SinkFailed(String),

    #[error("Export failed: {0}")]
    ExportFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ProbeError {
    pub(crate) fn invalid_signature(pattern: &str, reason: impl Into<String>) -> Self {
        ProbeError::InvalidSignature {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<config::ConfigError> for ProbeError {
    fn from(err: config::ConfigError) -> Self {
        ProbeError::ConfigError(err.to_string())
    }
}
