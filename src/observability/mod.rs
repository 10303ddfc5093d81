// src/observability/mod.rs
//! Logging and metrics setup
//!
//! Probes only emit counters. Durations live in the event rows themselves and
//! are never aggregated here.

use crate::utils::config::LoggingConfig;
use anyhow::{Context, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Metric names
pub mod names {
    pub const ROWS_OPENED: &str = "probe_rows_opened_total";
    pub const ROWS_CLOSED: &str = "probe_rows_closed_total";
    pub const ROWS_SKIPPED: &str = "probe_rows_skipped_total";
    pub const SINK_ERRORS: &str = "probe_sink_errors_total";
    pub const REGISTRY_RECORDS: &str = "registry_records_total";
    pub const REGISTRY_LOOKUPS: &str = "registry_lookups_total";
    pub const REGISTRY_SWEPT: &str = "registry_entries_swept_total";
    pub const REGISTRY_ENTRIES: &str = "registry_entries";
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .with_context(|| format!("invalid log filter '{}'", config.level))?;

    let registry = tracing_subscriber::registry().with(filter);

    if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .try_init()
            .context("failed to install JSON tracing subscriber")?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().compact().with_target(true))
            .try_init()
            .context("failed to install tracing subscriber")?;
    }

    Ok(())
}

/// Install the Prometheus metrics recorder
///
/// Returns a handle whose `render()` output can be served by the host.
pub fn init_metrics() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install Prometheus recorder")?;

    describe_metrics();

    Ok(handle)
}

fn describe_metrics() {
    metrics::describe_counter!(names::ROWS_OPENED, "Event rows opened, by category");
    metrics::describe_counter!(names::ROWS_CLOSED, "Event rows closed, by category");
    metrics::describe_counter!(
        names::ROWS_SKIPPED,
        "Ad-hoc executions skipped because the receiver was a prepared statement"
    );
    metrics::describe_counter!(names::SINK_ERRORS, "Event sink operations that failed");
    metrics::describe_counter!(
        names::REGISTRY_RECORDS,
        "Statement registrations that created an entry"
    );
    metrics::describe_counter!(names::REGISTRY_LOOKUPS, "Registry lookups, by result");
    metrics::describe_counter!(names::REGISTRY_SWEPT, "Dead registry entries reclaimed");
    metrics::describe_gauge!(names::REGISTRY_ENTRIES, "Entries currently held by the registry");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_rejected() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = LoggingConfig {
            level: "call_probes=loud".to_string(),
            json: false,
        };
        assert!(init_tracing(&config).is_err());
    }
}
