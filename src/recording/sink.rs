// src/recording/sink.rs
//! Event sink contract
//!
//! A sink stores lasting events as rows of named string columns. Probes open a
//! row when a call starts, fill its columns, and close it when the call ends.

use crate::utils::errors::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw value of "no row" in the integer handle contract
pub const NO_ROW: i64 = -1;

/// Event categories, one table each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Outbound RPC invocations
    Rpc,

    /// Ad-hoc SQL executed through a plain statement
    Query,

    /// Executions of prepared statements
    PreparedStatementQuery,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::Rpc,
        Category::Query,
        Category::PreparedStatementQuery,
    ];

    /// Table name as shown by the sink
    pub fn table_name(self) -> &'static str {
        match self {
            Category::Rpc => "RPC/Apache SOAP RPC",
            Category::Query => "Queries",
            Category::PreparedStatementQuery => "Prepared Statement Queries",
        }
    }

    pub fn columns(self) -> &'static [Column] {
        match self {
            Category::Rpc => &[Column::Url, Column::Message],
            Category::Query | Category::PreparedStatementQuery => &[Column::Sql],
        }
    }

    /// Short label used for metrics
    pub fn label(self) -> &'static str {
        match self {
            Category::Rpc => "rpc",
            Category::Query => "query",
            Category::PreparedStatementQuery => "prepared_statement_query",
        }
    }

    pub fn has_column(self, column: Column) -> bool {
        self.columns().contains(&column)
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Category::Rpc => 0,
            Category::Query => 1,
            Category::PreparedStatementQuery => 2,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// String columns of the event tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Column {
    #[serde(rename = "URL")]
    Url,
    Message,
    #[serde(rename = "SQL")]
    Sql,
}

impl Column {
    pub fn name(self) -> &'static str {
        match self {
            Column::Url => "URL",
            Column::Message => "Message",
            Column::Sql => "SQL",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Index of a row opened in a sink table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowHandle(usize);

impl RowHandle {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }

    /// Encode an optional row as the integer contract, `-1` meaning no row
    pub fn raw(row: Option<RowHandle>) -> i64 {
        match row {
            Some(handle) => i64::try_from(handle.0).unwrap_or(i64::MAX),
            None => NO_ROW,
        }
    }
}

impl fmt::Display for RowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Storage for lasting events
///
/// Implementations must be safe to call from any application thread.
pub trait EventSink: Send + Sync {
    /// Open a row; its duration starts now
    fn open_row(&self, category: Category) -> Result<RowHandle>;

    /// Set a string column of an open row
    fn set_field(&self, category: Category, row: RowHandle, column: Column, value: &str)
        -> Result<()>;

    /// End the row's duration; fails if the row is not open
    fn close_row(&self, category: Category, row: RowHandle) -> Result<()>;
}
