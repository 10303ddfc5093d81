// src/lib.rs
//! Call Probes Library
//!
//! Interception probes that observe live call activity in a host application
//! and record it as lasting events: outbound RPC invocations, ad-hoc SQL, and
//! prepared statement executions attributed back to the query they were
//! prepared from.
//!
//! # Architecture
//!
//! The library is structured into several key modules:
//!
//! - **interception**: host object model, observed signatures, dispatch table
//! - **probes**: enter/exit hooks and the recorder behind them
//! - **registry**: weakly keyed prepared statement to query association
//! - **recording**: event sink contract, in-memory sink, exporters
//! - **observability**: tracing and metrics setup
//! - **utils**: configuration and error types
//!
//! # Example
//!
//! ```
//! use call_probes::interception::{Invocation, OpaqueObject};
//! use call_probes::recording::{Category, Column, MemorySink};
//! use call_probes::{MethodSignature, Probes};
//! use std::sync::Arc;
//!
//! let probes = Probes::new(Arc::new(MemorySink::new()));
//!
//! let connection = OpaqueObject::connection();
//! let statement = OpaqueObject::prepared_statement();
//!
//! let prepare: MethodSignature = "*:prepareStatement(String)".parse().unwrap();
//! probes
//!     .scoped(&prepare, Invocation::on(connection).arg("SELECT * FROM t"))
//!     .finish(Some(&statement));
//!
//! let execute: MethodSignature = "*:executeQuery()".parse().unwrap();
//! probes.scoped(&execute, Invocation::on(statement)).finish(None);
//!
//! let rows = probes.sink().rows(Category::PreparedStatementQuery);
//! assert_eq!(rows[0].field(Column::Sql), Some("SELECT * FROM t"));
//! ```

pub mod interception;
pub mod observability;
pub mod probes;
pub mod recording;
pub mod registry;
pub mod utils;

// Re-export commonly used types
pub use interception::{CallShape, Invocation, MethodSignature, ObjectRef};
pub use probes::{CallRecorder, EnterOutcome, ProbeScope, Probes};
pub use recording::{EventSink, MemorySink, RowHandle};
pub use registry::{QueryText, StatementRegistry, UNKNOWN_QUERY};
pub use utils::config::ProbeConfig;
pub use utils::errors::{ProbeError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
