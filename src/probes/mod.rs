// src/probes/mod.rs
//! Interception probes
//!
//! - **Recorder**: per-shape enter/exit logic over a sink and a registry
//! - **Hooks**: tagged dispatch from a call shape to recorder methods
//! - **Probe Set**: signature resolution plus scoped enter/exit pairing
//!
//! # Call flow
//!
//! ```text
//! on_enter(sig, inv) ──► DispatchTable ──► CallShape::enter ──► row?
//!                                               │
//!                                   registry lookup (prepared execute)
//!
//! on_exit(outcome, inv, ret) ──► CallShape::exit ──► close row / record()
//! ```

pub mod hooks;
pub mod probe_set;
pub mod recorder;

// Re-export commonly used types
pub use probe_set::{EnterOutcome, ProbeScope, Probes};
pub use recorder::CallRecorder;
