// src/interception/call_shape.rs
//! The four call shapes the probes understand

use crate::recording::sink::Category;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of instrumented call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallShape {
    /// `invoke(URL, String)` on an RPC client
    RpcInvoke,

    /// SQL passed directly to `execute*` on a statement
    AdHocExecute,

    /// Argument-less `execute*` on a prepared statement
    PreparedExecute,

    /// `prepareStatement` / `prepareCall` on a connection
    StatementPreparation,
}

impl CallShape {
    pub const ALL: [CallShape; 4] = [
        CallShape::RpcInvoke,
        CallShape::AdHocExecute,
        CallShape::PreparedExecute,
        CallShape::StatementPreparation,
    ];

    /// Table the shape records into; preparation is not timed
    pub fn category(self) -> Option<Category> {
        match self {
            CallShape::RpcInvoke => Some(Category::Rpc),
            CallShape::AdHocExecute => Some(Category::Query),
            CallShape::PreparedExecute => Some(Category::PreparedStatementQuery),
            CallShape::StatementPreparation => None,
        }
    }

    /// Whether the SQL recorded or registered goes through the statement registry
    pub fn uses_registry(self) -> bool {
        matches!(
            self,
            CallShape::PreparedExecute | CallShape::StatementPreparation
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            CallShape::RpcInvoke => "rpc_invoke",
            CallShape::AdHocExecute => "ad_hoc_execute",
            CallShape::PreparedExecute => "prepared_execute",
            CallShape::StatementPreparation => "statement_preparation",
        }
    }
}

impl fmt::Display for CallShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
