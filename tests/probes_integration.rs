// tests/probes_integration.rs
//! End-to-end flows through the probe set, as a host framework drives them

use call_probes::interception::{Invocation, MethodSignature, ObjectRef, OpaqueObject};
use call_probes::recording::{Category, Column, ExportFormat, Exporter, MemorySink};
use call_probes::{EnterOutcome, Probes, StatementRegistry};
use std::sync::Arc;
use std::thread;
use url::Url;

fn sig(pattern: &str) -> MethodSignature {
    pattern.parse().unwrap()
}

fn create_probes() -> Probes<MemorySink> {
    Probes::new(Arc::new(MemorySink::new()))
}

fn prepare(probes: &Probes<MemorySink>, pattern: &str, query: &str) -> ObjectRef {
    let statement = OpaqueObject::prepared_statement();
    let invocation = Invocation::on(OpaqueObject::connection()).arg(query);

    let outcome = probes.on_enter(&sig(pattern), &invocation);
    probes.on_exit(outcome, &invocation, Some(&statement));

    statement
}

#[test]
fn test_rpc_invoke_records_every_call() {
    let probes = create_probes();
    let url = Url::parse("http://soap.example.com/soap/servlet/rpcrouter").unwrap();

    for _ in 0..3 {
        let invocation = Invocation::on(OpaqueObject::rpc_client())
            .arg(url.clone())
            .arg("<msg/>");
        let outcome = probes.on_enter(&sig("*:invoke(java.net.URL, java.lang.String)"), &invocation);
        assert!(outcome.row().is_some());
        probes.on_exit(outcome, &invocation, None);
    }

    let rows = probes.sink().rows(Category::Rpc);
    assert_eq!(rows.len(), 3);
    for row in rows {
        assert_eq!(row.field(Column::Url), Some(url.as_str()));
        assert_eq!(row.field(Column::Message), Some("<msg/>"));
        assert!(!row.is_open());
    }
}

#[test]
fn test_ad_hoc_select_on_plain_statement() {
    let probes = create_probes();
    let invocation = Invocation::on(OpaqueObject::statement()).arg("SELECT 1");

    let outcome = probes.on_enter(&sig("*:executeQuery(String)"), &invocation);
    assert_eq!(probes.sink().open_row_count(Category::Query), 1);
    probes.on_exit(outcome, &invocation, None);

    let rows = probes.sink().rows(Category::Query);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].field(Column::Sql), Some("SELECT 1"));
    assert!(!rows[0].is_open());
}

#[test]
fn test_ad_hoc_on_prepared_receiver_is_noop() {
    let probes = create_probes();
    let invocation = Invocation::on(OpaqueObject::prepared_statement()).arg("SELECT 1");

    let outcome = probes.on_enter(&sig("*:execute(String, int)"), &invocation);
    assert_eq!(outcome.raw(), -1);
    probes.on_exit(outcome, &invocation, None);

    assert_eq!(probes.sink().row_count(Category::Query), 0);
    assert_eq!(probes.sink().row_count(Category::PreparedStatementQuery), 0);
}

#[test]
fn test_prepared_statement_attributed_to_preparation() {
    let probes = create_probes();
    let statement = prepare(&probes, "*:prepareStatement(String, int)", "SELECT * FROM t");

    for pattern in ["*:execute()", "*:executeQuery()", "*:executeUpdate()"] {
        let invocation = Invocation::on(Arc::clone(&statement));
        let outcome = probes.on_enter(&sig(pattern), &invocation);
        probes.on_exit(outcome, &invocation, None);
    }

    let rows = probes.sink().rows(Category::PreparedStatementQuery);
    assert_eq!(rows.len(), 3);
    assert!(rows
        .iter()
        .all(|row| row.field(Column::Sql) == Some("SELECT * FROM t") && !row.is_open()));
}

#[test]
fn test_callable_statement_registered_through_prepare_call() {
    let probes = create_probes();
    let statement = OpaqueObject::callable_statement();
    let invocation = Invocation::on(OpaqueObject::connection())
        .arg("{call refresh_totals(?)}")
        .arg(1003)
        .arg(1007)
        .arg(1);

    let outcome = probes.on_enter(&sig("*:prepareCall(String, int, int, int)"), &invocation);
    probes.on_exit(outcome, &invocation, Some(&statement));

    assert_eq!(
        probes.registry().lookup(&statement).as_str(),
        "{call refresh_totals(?)}"
    );
}

#[test]
fn test_unregistered_prepared_statement_is_unknown() {
    let probes = create_probes();
    let invocation = Invocation::on(OpaqueObject::prepared_statement());

    let outcome = probes.on_enter(&sig("*:executeQuery()"), &invocation);
    probes.on_exit(outcome, &invocation, None);

    let rows = probes.sink().rows(Category::PreparedStatementQuery);
    assert_eq!(rows[0].field(Column::Sql), Some("unknown"));
}

#[test]
fn test_second_preparation_result_does_not_overwrite() {
    let probes = create_probes();
    let statement = prepare(&probes, "*:prepareStatement(String)", "SELECT 1");

    let invocation = Invocation::on(OpaqueObject::connection()).arg("SELECT 2");
    let outcome = probes.on_enter(&sig("*:prepareStatement(String)"), &invocation);
    probes.on_exit(outcome, &invocation, Some(&statement));

    assert_eq!(probes.registry().lookup(&statement).as_str(), "SELECT 1");
}

#[test]
fn test_shared_registry_across_probe_sets() {
    let registry = Arc::new(StatementRegistry::new());
    let first = Probes::with_registry(Arc::new(MemorySink::new()), Arc::clone(&registry));
    let second = Probes::with_registry(Arc::new(MemorySink::new()), Arc::clone(&registry));

    let statement = prepare(&first, "*:prepareStatement(String)", "SELECT shared");

    let invocation = Invocation::on(statement);
    let outcome = second.on_enter(&sig("*:execute()"), &invocation);
    second.on_exit(outcome, &invocation, None);

    let rows = second.sink().rows(Category::PreparedStatementQuery);
    assert_eq!(rows[0].field(Column::Sql), Some("SELECT shared"));
    assert_eq!(first.sink().row_count(Category::PreparedStatementQuery), 0);
}

#[test]
fn test_concurrent_mixed_workload_closes_every_row() {
    let probes = Arc::new(create_probes());
    let mut handles = vec![];

    for worker in 0..8 {
        let probes = Arc::clone(&probes);
        handles.push(thread::spawn(move || {
            for i in 0..100 {
                let query = format!("SELECT {} FROM w{}", i, worker);
                let statement = prepare(&probes, "*:prepareStatement(String)", &query);

                let execute = Invocation::on(Arc::clone(&statement));
                let outcome = probes.on_enter(&sig("*:executeUpdate()"), &execute);
                probes.on_exit(outcome, &execute, None);

                let ad_hoc = Invocation::on(OpaqueObject::statement()).arg(query.as_str());
                let outcome = probes.on_enter(&sig("*:execute(String)"), &ad_hoc);
                probes.on_exit(outcome, &ad_hoc, None);
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let sink = probes.sink();
    assert_eq!(sink.row_count(Category::PreparedStatementQuery), 800);
    assert_eq!(sink.row_count(Category::Query), 800);
    assert_eq!(sink.open_row_count(Category::PreparedStatementQuery), 0);
    assert_eq!(sink.open_row_count(Category::Query), 0);

    let prepared = sink.rows(Category::PreparedStatementQuery);
    assert!(prepared
        .iter()
        .all(|row| row.field(Column::Sql).is_some_and(|sql| sql.starts_with("SELECT "))));
}

#[test]
fn test_discarded_statements_are_reclaimed() {
    let probes = create_probes();

    for i in 0..5_000 {
        let statement = prepare(&probes, "*:prepareStatement(String)", &format!("SELECT {}", i));
        let invocation = Invocation::on(statement);
        let outcome = probes.on_enter(&sig("*:execute()"), &invocation);
        probes.on_exit(outcome, &invocation, None);
    }

    probes.registry().sweep();
    assert_eq!(probes.registry().len(), 0);
}

#[test]
fn test_export_after_session() {
    let probes = create_probes();
    let invocation = Invocation::on(OpaqueObject::statement()).arg("SELECT 1");
    let outcome = probes.on_enter(&sig("*:executeQuery(String)"), &invocation);
    assert!(matches!(outcome, EnterOutcome::Entered { .. }));
    probes.on_exit(outcome, &invocation, None);

    let csv = Exporter::new(ExportFormat::Csv)
        .export(&probes.sink().snapshot())
        .unwrap();

    assert!(csv.contains("# Queries"));
    assert!(csv.contains(",SELECT 1"));
}
