// src/recording/memory_sink.rs
//! In-memory event sink
//!
//! Keeps every row of every category in process memory. Row handles are
//! indices into an append-only table, so a handle is never reused.

use crate::recording::sink::{Category, Column, EventSink, RowHandle};
use crate::utils::config::SinkConfig;
use crate::utils::errors::{ProbeError, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// A recorded lasting event
#[derive(Debug, Clone, Serialize)]
pub struct EventRow {
    pub index: usize,
    pub category: Category,
    pub fields: BTreeMap<Column, String>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl EventRow {
    pub fn field(&self, column: Column) -> Option<&str> {
        self.fields.get(&column).map(String::as_str)
    }

    pub fn is_open(&self) -> bool {
        self.closed_at.is_none()
    }

    /// Duration in microseconds, once closed
    pub fn duration_us(&self) -> Option<i64> {
        self.closed_at
            .map(|closed| (closed - self.opened_at).num_microseconds().unwrap_or(i64::MAX))
    }
}

/// Point-in-time copy of one table
#[derive(Debug, Clone, Serialize)]
pub struct TableSnapshot {
    pub name: &'static str,
    pub category: Category,
    pub columns: Vec<Column>,
    pub rows: Vec<EventRow>,
}

/// Point-in-time copy of all tables
#[derive(Debug, Clone, Serialize)]
pub struct SinkSnapshot {
    pub taken_at: DateTime<Utc>,
    pub tables: Vec<TableSnapshot>,
}

impl SinkSnapshot {
    pub fn table(&self, category: Category) -> Option<&TableSnapshot> {
        self.tables.iter().find(|table| table.category == category)
    }
}

#[derive(Default)]
struct TableState {
    rows: Vec<EventRow>,
}

impl TableState {
    fn open_row_mut(&mut self, category: Category, row: RowHandle) -> Result<&mut EventRow> {
        self.rows
            .get_mut(row.index())
            .filter(|event| event.is_open())
            .ok_or(ProbeError::RowNotOpen {
                table: category.table_name(),
                row: row.index(),
            })
    }
}

/// Event sink holding rows in memory
pub struct MemorySink {
    tables: [Mutex<TableState>; 3],
}

impl MemorySink {
    pub fn new() -> Self {
        Self::with_config(&SinkConfig::default())
    }

    pub fn with_config(config: &SinkConfig) -> Self {
        let table = || {
            Mutex::new(TableState {
                rows: Vec::with_capacity(config.initial_rows_per_table),
            })
        };

        Self {
            tables: [table(), table(), table()],
        }
    }

    fn table(&self, category: Category) -> &Mutex<TableState> {
        &self.tables[category.index()]
    }

    /// Copy of all rows of one category
    pub fn rows(&self, category: Category) -> Vec<EventRow> {
        self.table(category).lock().rows.clone()
    }

    pub fn row(&self, category: Category, row: RowHandle) -> Option<EventRow> {
        self.table(category).lock().rows.get(row.index()).cloned()
    }

    pub fn row_count(&self, category: Category) -> usize {
        self.table(category).lock().rows.len()
    }

    /// Rows opened but not yet closed
    pub fn open_row_count(&self, category: Category) -> usize {
        self.table(category)
            .lock()
            .rows
            .iter()
            .filter(|row| row.is_open())
            .count()
    }

    pub fn snapshot(&self) -> SinkSnapshot {
        SinkSnapshot {
            taken_at: Utc::now(),
            tables: Category::ALL
                .into_iter()
                .map(|category| TableSnapshot {
                    name: category.table_name(),
                    category,
                    columns: category.columns().to_vec(),
                    rows: self.rows(category),
                })
                .collect(),
        }
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for MemorySink {
    fn open_row(&self, category: Category) -> Result<RowHandle> {
        let mut table = self.table(category).lock();
        let index = table.rows.len();

        table.rows.push(EventRow {
            index,
            category,
            fields: BTreeMap::new(),
            opened_at: Utc::now(),
            closed_at: None,
        });

        Ok(RowHandle::new(index))
    }

    fn set_field(
        &self,
        category: Category,
        row: RowHandle,
        column: Column,
        value: &str,
    ) -> Result<()> {
        if !category.has_column(column) {
            return Err(ProbeError::UnknownColumn {
                table: category.table_name(),
                column: column.name().to_string(),
            });
        }

        let mut table = self.table(category).lock();
        let event = table.open_row_mut(category, row)?;
        event.fields.insert(column, value.to_string());

        Ok(())
    }

    fn close_row(&self, category: Category, row: RowHandle) -> Result<()> {
        let mut table = self.table(category).lock();
        let event = table.open_row_mut(category, row)?;
        event.closed_at = Some(Utc::now());

        debug!(table = category.table_name(), row = row.index(), "Row closed");
        Ok(())
    }
}
