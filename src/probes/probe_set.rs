// src/probes/probe_set.rs
//! Entry point for host instrumentation frameworks
//!
//! A [`Probes`] instance owns one recorder and its registry. Hosts either
//! drive `on_enter`/`on_exit` themselves or wrap each call in a
//! [`ProbeScope`], which guarantees the exit hook runs once even if the call
//! unwinds.

use crate::interception::call_shape::CallShape;
use crate::interception::dispatch_table::DispatchTable;
use crate::interception::host::ObjectRef;
use crate::interception::invocation::Invocation;
use crate::interception::signature::MethodSignature;
use crate::probes::recorder::CallRecorder;
use crate::recording::sink::{EventSink, RowHandle, NO_ROW};
use crate::registry::StatementRegistry;
use crate::utils::config::ProbeConfig;
use std::sync::Arc;
use tracing::{info, trace};

/// Result of an enter hook, to be handed back to the exit hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterOutcome {
    /// The signature is not observed; exit does nothing
    NotInstrumented,

    /// A probe ran; `row` is `None` when it chose not to record
    Entered {
        shape: CallShape,
        row: Option<RowHandle>,
    },
}

impl EnterOutcome {
    pub fn row(&self) -> Option<RowHandle> {
        match self {
            EnterOutcome::Entered { row, .. } => *row,
            EnterOutcome::NotInstrumented => None,
        }
    }

    pub fn shape(&self) -> Option<CallShape> {
        match self {
            EnterOutcome::Entered { shape, .. } => Some(*shape),
            EnterOutcome::NotInstrumented => None,
        }
    }

    /// Row handle in the integer contract, `-1` for no row
    pub fn raw(&self) -> i64 {
        match self {
            EnterOutcome::Entered { row, .. } => RowHandle::raw(*row),
            EnterOutcome::NotInstrumented => NO_ROW,
        }
    }
}

/// The full set of probes bound to one sink and one registry
pub struct Probes<S: EventSink> {
    recorder: CallRecorder<S>,
    table: &'static DispatchTable,
}

impl<S: EventSink> Probes<S> {
    /// Create probes with a fresh registry
    pub fn new(sink: Arc<S>) -> Self {
        Self::with_registry(sink, Arc::new(StatementRegistry::new()))
    }

    /// Create probes sharing an existing registry
    pub fn with_registry(sink: Arc<S>, registry: Arc<StatementRegistry>) -> Self {
        Self {
            recorder: CallRecorder::new(sink, registry),
            table: DispatchTable::standard(),
        }
    }

    /// Create probes with a registry tuned by `config`
    pub fn from_config(sink: Arc<S>, config: &ProbeConfig) -> Self {
        info!(
            "Initializing probes (registry sweep every {} inserts)",
            config.registry.sweep_interval
        );
        Self::with_registry(
            sink,
            Arc::new(StatementRegistry::with_config(&config.registry)),
        )
    }

    pub fn recorder(&self) -> &CallRecorder<S> {
        &self.recorder
    }

    pub fn registry(&self) -> &Arc<StatementRegistry> {
        self.recorder.registry()
    }

    pub fn sink(&self) -> &Arc<S> {
        self.recorder.sink()
    }

    /// Call shape observing `signature`, if any
    pub fn resolve(&self, signature: &MethodSignature) -> Option<CallShape> {
        self.table.resolve(signature)
    }

    /// Enter hook: a call matching `signature` is starting
    pub fn on_enter(&self, signature: &MethodSignature, invocation: &Invocation) -> EnterOutcome {
        let Some(shape) = self.table.resolve(signature) else {
            trace!(%signature, "Signature not instrumented");
            return EnterOutcome::NotInstrumented;
        };

        let row = shape.enter(&self.recorder, invocation);
        trace!(%signature, %shape, row = RowHandle::raw(row), "Entered probe");

        EnterOutcome::Entered { shape, row }
    }

    /// Exit hook: the call that produced `outcome` has completed
    ///
    /// `return_value` is the produced statement for preparation calls and is
    /// ignored otherwise.
    pub fn on_exit(
        &self,
        outcome: EnterOutcome,
        invocation: &Invocation,
        return_value: Option<&ObjectRef>,
    ) {
        if let EnterOutcome::Entered { shape, row } = outcome {
            shape.exit(&self.recorder, invocation, return_value, row);
        }
    }

    /// Run the enter hook and return a guard that runs the exit hook
    pub fn scoped(&self, signature: &MethodSignature, invocation: Invocation) -> ProbeScope<'_, S> {
        let outcome = self.on_enter(signature, &invocation);

        ProbeScope {
            probes: self,
            invocation,
            outcome,
            exited: false,
        }
    }
}

/// Guard pairing one enter with exactly one exit
///
/// Call [`ProbeScope::finish`] on normal completion. If the guard is dropped
/// without it (early return, panic), exit runs with no return value.
pub struct ProbeScope<'a, S: EventSink> {
    probes: &'a Probes<S>,
    invocation: Invocation,
    outcome: EnterOutcome,
    exited: bool,
}

impl<'a, S: EventSink> ProbeScope<'a, S> {
    pub fn outcome(&self) -> EnterOutcome {
        self.outcome
    }

    /// Complete the call with its return value
    pub fn finish(mut self, return_value: Option<&ObjectRef>) {
        self.exit(return_value);
    }

    fn exit(&mut self, return_value: Option<&ObjectRef>) {
        if self.exited {
            return;
        }
        self.exited = true;
        self.probes
            .on_exit(self.outcome, &self.invocation, return_value);
    }
}

impl<'a, S: EventSink> Drop for ProbeScope<'a, S> {
    fn drop(&mut self) {
        self.exit(None);
    }
}
