// src/interception/dispatch_table.rs
//! Static table mapping observed signatures to call shapes
//!
//! Matching is exact on name and parameter list. Receiver type plays no part
//! here; the ad-hoc execute probe checks it at call time.

use crate::interception::call_shape::CallShape;
use crate::interception::signature::MethodSignature;
use crate::utils::errors::Result;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::debug;

use crate::interception::signature::ParamType::{Int, IntArray, String as Str, StringArray, Url};

/// Signatures of the RPC invoke probe
pub const RPC_INVOKE: &[MethodSignature] = &[MethodSignature::from_static("invoke", &[Url, Str])];

/// Signatures of the ad-hoc execute probe
pub const AD_HOC_EXECUTE: &[MethodSignature] = &[
    MethodSignature::from_static("execute", &[Str]),
    MethodSignature::from_static("execute", &[Str, Int]),
    MethodSignature::from_static("execute", &[Str, IntArray]),
    MethodSignature::from_static("execute", &[Str, StringArray]),
    MethodSignature::from_static("executeQuery", &[Str]),
    MethodSignature::from_static("executeUpdate", &[Str]),
    MethodSignature::from_static("executeUpdate", &[Str, Int]),
    MethodSignature::from_static("executeUpdate", &[Str, IntArray]),
    MethodSignature::from_static("executeUpdate", &[Str, StringArray]),
];

/// Signatures of the prepared execute probe
pub const PREPARED_EXECUTE: &[MethodSignature] = &[
    MethodSignature::from_static("execute", &[]),
    MethodSignature::from_static("executeQuery", &[]),
    MethodSignature::from_static("executeUpdate", &[]),
];

/// Signatures of the statement preparation probe
pub const STATEMENT_PREPARATION: &[MethodSignature] = &[
    MethodSignature::from_static("prepareStatement", &[Str]),
    MethodSignature::from_static("prepareStatement", &[Str, Int]),
    MethodSignature::from_static("prepareStatement", &[Str, IntArray]),
    MethodSignature::from_static("prepareStatement", &[Str, StringArray]),
    MethodSignature::from_static("prepareStatement", &[Str, Int, Int]),
    MethodSignature::from_static("prepareStatement", &[Str, Int, Int, Int]),
    MethodSignature::from_static("prepareCall", &[Str]),
    MethodSignature::from_static("prepareCall", &[Str, Int, Int]),
    MethodSignature::from_static("prepareCall", &[Str, Int, Int, Int]),
];

static STANDARD: Lazy<DispatchTable> = Lazy::new(DispatchTable::build);

/// Read-only signature to call shape table
#[derive(Debug)]
pub struct DispatchTable {
    shapes: HashMap<MethodSignature, CallShape>,
}

impl DispatchTable {
    /// The process-wide table, built on first use
    pub fn standard() -> &'static DispatchTable {
        &STANDARD
    }

    fn build() -> Self {
        let groups = [
            (CallShape::RpcInvoke, RPC_INVOKE),
            (CallShape::AdHocExecute, AD_HOC_EXECUTE),
            (CallShape::PreparedExecute, PREPARED_EXECUTE),
            (CallShape::StatementPreparation, STATEMENT_PREPARATION),
        ];

        let shapes: HashMap<_, _> = groups
            .into_iter()
            .flat_map(|(shape, signatures)| {
                signatures.iter().cloned().map(move |signature| (signature, shape))
            })
            .collect();

        debug!("Built dispatch table with {} signatures", shapes.len());

        Self { shapes }
    }

    /// Call shape observing `signature`, if any
    pub fn resolve(&self, signature: &MethodSignature) -> Option<CallShape> {
        self.shapes.get(signature).copied()
    }

    /// Resolve a signature given in pattern form
    pub fn resolve_pattern(&self, pattern: &str) -> Result<Option<CallShape>> {
        let signature: MethodSignature = pattern.parse()?;
        Ok(self.resolve(&signature))
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}
