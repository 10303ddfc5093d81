// src/registry/mod.rs
//! Statement registry
//!
//! Remembers the query text each prepared statement was created from so that
//! later executions, which carry no SQL argument, can be attributed.
//!
//! - **StatementRegistry**: identity-keyed, weakly referencing concurrent map
//! - **QueryText**: registered text or the `unknown` sentinel
//!
//! # Concurrency
//!
//! - `record` is an atomic insert-if-absent under the key's shard lock
//! - `lookup` observes either no entry or a fully built one
//! - No operation waits on anything but a shard lock

pub mod statement_registry;

pub use statement_registry::{QueryText, StatementRegistry, UNKNOWN_QUERY};
