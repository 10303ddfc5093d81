// src/probes/hooks.rs
//! Per-shape enter and exit hooks
//!
//! Each call shape picks its arguments out of the invocation and records into
//! the table named by [`CallShape::category`]. Positions follow the observed
//! signatures: `invoke(URL, String)`, `execute*(String, ..)`,
//! `prepare*(String, ..)`.

use crate::interception::call_shape::CallShape;
use crate::interception::host::ObjectRef;
use crate::interception::invocation::Invocation;
use crate::probes::recorder::CallRecorder;
use crate::recording::sink::{Column, EventSink, RowHandle};
use crate::registry::UNKNOWN_QUERY;
use url::Url;

impl CallShape {
    /// Run the enter hook; `None` means no row was opened
    pub fn enter<S: EventSink>(
        self,
        recorder: &CallRecorder<S>,
        invocation: &Invocation,
    ) -> Option<RowHandle> {
        // Untimed shapes have no table
        let category = self.category()?;

        match self {
            CallShape::RpcInvoke => {
                let url = invocation.url_param(1).map(Url::as_str).unwrap_or_default();
                let message = invocation.str_param(2).unwrap_or_default();

                recorder.open(category, &[(Column::Url, url), (Column::Message, message)])
            }
            CallShape::AdHocExecute | CallShape::PreparedExecute => {
                let registered;
                let query = if self.uses_registry() {
                    registered = recorder.registered_query(invocation.receiver());
                    registered.as_str()
                } else if recorder.skips_receiver(invocation.receiver()) {
                    return None;
                } else {
                    invocation.str_param(1).unwrap_or(UNKNOWN_QUERY)
                };

                recorder.open(category, &[(Column::Sql, query)])
            }
            CallShape::StatementPreparation => None,
        }
    }

    /// Run the exit hook with the row returned by [`CallShape::enter`]
    ///
    /// `return_value` is only consulted by statement preparation.
    pub fn exit<S: EventSink>(
        self,
        recorder: &CallRecorder<S>,
        invocation: &Invocation,
        return_value: Option<&ObjectRef>,
        row: Option<RowHandle>,
    ) {
        match self.category() {
            Some(category) => recorder.close(category, row),
            None => recorder.preparation_return(invocation.str_param(1), return_value),
        }
    }
}
