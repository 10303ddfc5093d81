// src/recording/exporter.rs
//! Export recorded events
//!
//! Supports:
//! - JSON (full snapshot, for tooling)
//! - CSV (one flat section per table, for spreadsheets)

use crate::recording::memory_sink::{EventRow, SinkSnapshot, TableSnapshot};
use crate::utils::errors::{ProbeError, Result};
use chrono::SecondsFormat;
use tracing::debug;

/// Export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// JSON format
    Json,

    /// Comma separated values
    Csv,
}

/// Exporter for sink snapshots
pub struct Exporter {
    format: ExportFormat,
}

impl Exporter {
    /// Create a new exporter
    pub fn new(format: ExportFormat) -> Self {
        Self { format }
    }

    /// Export a whole snapshot to string
    pub fn export(&self, snapshot: &SinkSnapshot) -> Result<String> {
        debug!(
            "Exporting {} tables to {:?} format",
            snapshot.tables.len(),
            self.format
        );

        match self.format {
            ExportFormat::Json => serde_json::to_string_pretty(snapshot).map_err(|e| {
                ProbeError::ExportFailed(format!("JSON serialization error: {}", e))
            }),
            ExportFormat::Csv => Ok(snapshot
                .tables
                .iter()
                .map(|table| format!("# {}\n{}", table.name, export_table_csv(table)))
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    /// Export a single table to string
    pub fn export_table(&self, table: &TableSnapshot) -> Result<String> {
        match self.format {
            ExportFormat::Json => serde_json::to_string_pretty(table).map_err(|e| {
                ProbeError::ExportFailed(format!("JSON serialization error: {}", e))
            }),
            ExportFormat::Csv => Ok(export_table_csv(table)),
        }
    }
}

fn export_table_csv(table: &TableSnapshot) -> String {
    let mut header = vec!["Row", "Start", "End", "Duration (us)"];
    header.extend(table.columns.iter().map(|column| column.name()));

    let mut out = header.join(",");
    out.push('\n');

    for row in &table.rows {
        out.push_str(&csv_line(table, row));
        out.push('\n');
    }

    out
}

fn csv_line(table: &TableSnapshot, row: &EventRow) -> String {
    let mut cells = vec![
        row.index.to_string(),
        row.opened_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        row.closed_at
            .map(|closed| closed.to_rfc3339_opts(SecondsFormat::Micros, true))
            .unwrap_or_default(),
        row.duration_us().map(|d| d.to_string()).unwrap_or_default(),
    ];

    cells.extend(
        table
            .columns
            .iter()
            .map(|column| escape_csv(row.field(*column).unwrap_or_default())),
    );

    cells.join(",")
}

fn escape_csv(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
