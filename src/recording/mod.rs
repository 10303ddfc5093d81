// src/recording/mod.rs
//! Event recording
//!
//! - **Sink**: the row-oriented storage contract probes write to
//! - **Memory Sink**: in-process sink with per-table locking
//! - **Exporter**: JSON and CSV export of sink snapshots
//!
//! # Row lifecycle
//!
//! ```text
//! enter hook ──► open_row() ──► set_field()* ──► exit hook ──► close_row()
//!     │
//!     └─ skipped ──► no row ──────────────────► exit hook ──► no-op
//! ```

pub mod exporter;
pub mod memory_sink;
pub mod sink;

// Re-export commonly used types
pub use exporter::{ExportFormat, Exporter};
pub use memory_sink::{EventRow, MemorySink, SinkSnapshot, TableSnapshot};
pub use sink::{Category, Column, EventSink, RowHandle, NO_ROW};
