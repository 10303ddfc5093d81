// src/interception/mod.rs
//! Call interception boundary
//!
//! The host instrumentation framework decides when hooks fire. This module
//! describes what it hands over and which calls are observed:
//!
//! - **Host**: host objects and their identity
//! - **Invocation**: receiver plus positional arguments of one call
//! - **Signature**: method signatures in pattern form
//! - **Call Shape**: the four kinds of observed call
//! - **Dispatch Table**: static signature to call shape mapping
//!
//! # Architecture
//!
//! ```text
//! Host framework
//!     │
//!     ├─ signature ──► DispatchTable ──► CallShape
//!     └─ receiver + args ──► Invocation
//!                                │
//!                                ▼
//!                        probes::Probes hooks
//! ```

pub mod call_shape;
pub mod dispatch_table;
pub mod host;
pub mod invocation;
pub mod signature;

// Re-export commonly used types
pub use call_shape::CallShape;
pub use dispatch_table::DispatchTable;
pub use host::{HostObject, ObjectId, ObjectKind, ObjectRef, OpaqueObject};
pub use invocation::{ArgValue, Invocation};
pub use signature::{MethodSignature, ParamType};
