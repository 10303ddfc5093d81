// src/probes/recorder.rs
//! Row and registry primitives shared by the call shapes
//!
//! Every method here is infallible from the caller's point of view. Sink
//! failures are logged and counted; a row that failed to open becomes "no
//! row", which its exit then ignores. Which table a call lands in is decided
//! by its [`CallShape`](crate::interception::CallShape), never here.

use crate::interception::host::ObjectRef;
use crate::observability::names;
use crate::recording::sink::{Category, Column, EventSink, RowHandle};
use crate::registry::{QueryText, StatementRegistry};
use crate::utils::errors::ProbeError;
use std::sync::Arc;
use tracing::{debug, warn};

/// Records calls into an event sink, resolving prepared statements through
/// a statement registry
pub struct CallRecorder<S: EventSink> {
    sink: Arc<S>,
    registry: Arc<StatementRegistry>,
}

impl<S: EventSink> CallRecorder<S> {
    pub fn new(sink: Arc<S>, registry: Arc<StatementRegistry>) -> Self {
        Self { sink, registry }
    }

    pub fn sink(&self) -> &Arc<S> {
        &self.sink
    }

    pub fn registry(&self) -> &Arc<StatementRegistry> {
        &self.registry
    }

    /// Open a row in `category` and fill its columns
    pub fn open(&self, category: Category, fields: &[(Column, &str)]) -> Option<RowHandle> {
        let row = match self.sink.open_row(category) {
            Ok(row) => row,
            Err(e) => {
                self.sink_failed("open_row", category, &e);
                return None;
            }
        };

        for (column, value) in fields {
            if let Err(e) = self.sink.set_field(category, row, *column, value) {
                self.sink_failed("set_field", category, &e);
            }
        }

        metrics::counter!(names::ROWS_OPENED, "category" => category.label()).increment(1);
        Some(row)
    }

    /// Close a row opened by [`CallRecorder::open`]; no row is a no-op
    pub fn close(&self, category: Category, row: Option<RowHandle>) {
        let Some(row) = row else {
            return;
        };

        match self.sink.close_row(category, row) {
            Ok(()) => {
                metrics::counter!(names::ROWS_CLOSED, "category" => category.label())
                    .increment(1);
            }
            Err(e) => self.sink_failed("close_row", category, &e),
        }
    }

    /// Whether an ad-hoc execute on `receiver` must not be recorded
    ///
    /// Prepared statements inherit the ad-hoc signatures; their executions
    /// are recorded by the prepared execute shape instead.
    pub fn skips_receiver(&self, receiver: Option<&ObjectRef>) -> bool {
        match receiver {
            Some(statement) if statement.is_prepared_statement() => {
                debug!(
                    receiver = statement.type_name(),
                    "Skipping ad-hoc execute on prepared statement"
                );
                metrics::counter!(names::ROWS_SKIPPED).increment(1);
                true
            }
            _ => false,
        }
    }

    /// Text registered when `statement` was prepared
    pub fn registered_query(&self, statement: Option<&ObjectRef>) -> QueryText {
        statement
            .map(|statement| self.registry.lookup(statement))
            .unwrap_or(QueryText::Unknown)
    }

    /// Statement preparation returned
    ///
    /// Not timed; only associates the produced statement with its query.
    pub fn preparation_return(&self, query: Option<&str>, prepared: Option<&ObjectRef>) {
        let Some(statement) = prepared else {
            return;
        };

        self.registry.record(statement, query);
    }

    fn sink_failed(&self, operation: &'static str, category: Category, error: &ProbeError) {
        warn!(
            operation,
            table = category.table_name(),
            "Event sink operation failed: {}",
            error
        );
        metrics::counter!(names::SINK_ERRORS).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interception::host::OpaqueObject;
    use crate::recording::memory_sink::MemorySink;
    use crate::registry::UNKNOWN_QUERY;
    use crate::utils::errors::Result;

    fn create_recorder() -> CallRecorder<MemorySink> {
        CallRecorder::new(
            Arc::new(MemorySink::new()),
            Arc::new(StatementRegistry::new()),
        )
    }

    #[test]
    fn test_open_fills_columns_and_close_ends_row() {
        let recorder = create_recorder();

        let row = recorder.open(
            Category::Rpc,
            &[(Column::Url, "http://soap.local/rpcrouter"), (Column::Message, "<msg/>")],
        );
        assert!(row.is_some());
        assert_eq!(recorder.sink().open_row_count(Category::Rpc), 1);

        recorder.close(Category::Rpc, row);

        let rows = recorder.sink().rows(Category::Rpc);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].field(Column::Url), Some("http://soap.local/rpcrouter"));
        assert_eq!(rows[0].field(Column::Message), Some("<msg/>"));
        assert!(!rows[0].is_open());
    }

    #[test]
    fn test_close_without_row_is_noop() {
        let recorder = create_recorder();

        recorder.close(Category::Query, None);
        assert_eq!(recorder.sink().row_count(Category::Query), 0);
    }

    #[test]
    fn test_only_prepared_receivers_are_skipped() {
        let recorder = create_recorder();

        assert!(recorder.skips_receiver(Some(&OpaqueObject::prepared_statement())));
        assert!(recorder.skips_receiver(Some(&OpaqueObject::callable_statement())));
        assert!(!recorder.skips_receiver(Some(&OpaqueObject::statement())));
        assert!(!recorder.skips_receiver(None));
    }

    #[test]
    fn test_registered_query_follows_preparation() {
        let recorder = create_recorder();
        let stmt = OpaqueObject::prepared_statement();

        assert_eq!(recorder.registered_query(Some(&stmt)).as_str(), UNKNOWN_QUERY);
        recorder.preparation_return(Some("SELECT * FROM t"), Some(&stmt));
        assert_eq!(recorder.registered_query(Some(&stmt)).as_str(), "SELECT * FROM t");
        assert_eq!(recorder.registered_query(None), QueryText::Unknown);
    }

    #[test]
    fn test_null_preparation_result_registers_nothing() {
        let recorder = create_recorder();

        recorder.preparation_return(Some("SELECT 1"), None);
        assert!(recorder.registry().is_empty());
    }

    struct FailingSink;

    impl EventSink for FailingSink {
        fn open_row(&self, _category: Category) -> Result<RowHandle> {
            Err(ProbeError::SinkFailed("table full".to_string()))
        }

        fn set_field(&self, _: Category, _: RowHandle, _: Column, _: &str) -> Result<()> {
            unreachable!("no row was ever opened")
        }

        fn close_row(&self, _: Category, _: RowHandle) -> Result<()> {
            unreachable!("no row was ever opened")
        }
    }

    #[test]
    fn test_sink_failure_degrades_to_no_row() {
        let recorder = CallRecorder::new(Arc::new(FailingSink), Arc::new(StatementRegistry::new()));

        let row = recorder.open(Category::Query, &[(Column::Sql, "SELECT 1")]);
        assert_eq!(row, None);

        recorder.close(Category::Query, row);
    }
}
