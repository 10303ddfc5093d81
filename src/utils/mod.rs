// src/utils/mod.rs
//! Common utilities: error types and configuration

pub mod config;
pub mod errors;

pub use config::{LoggingConfig, ProbeConfig, RegistryConfig, SinkConfig};
pub use errors::{ProbeError, Result};
