//! End-to-end sandbox query tests
//!
//! Tests cover:
//! - The acceptance query and first/second query behaviour
//! - Rejections and unknown assignments never touch the engine
//! - Error-code classification and scrubbed engine messages
//! - Statement timeout, cancellation, the result row cap and pool exhaustion
//! - Result JSON shape and value rendering
//! - The shared `public` schema

mod common;

use ciphersql_commons::AssignmentId;
use ciphersql_core::models::{QueryPhase, QueryRequest};
use ciphersql_core::ErrorCode;
use common::*;
use datafusion::arrow::datatypes::{DataType, Field, Schema};
use datafusion::scalar::ScalarValue;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::test]
async fn test_acceptance_query() {
    let sandbox = sandbox();
    let result = query(
        &sandbox,
        CUSTOMERS_ASSIGNMENT,
        "SELECT * FROM customers WHERE email LIKE '%@example.com'",
    )
    .await;

    assert_eq!(expect_success(&result), 2);
    let names: Vec<&str> = result.columns().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "name", "email", "created_at"]);
}

#[tokio::test]
async fn test_first_and_second_query() {
    let sandbox = sandbox();
    let request = QueryRequest::new(CUSTOMERS_ASSIGNMENT, "SELECT name FROM customers ORDER BY id");

    let first = sandbox.execute_query_with_report(&request).await;
    assert_eq!(first.phase, QueryPhase::Succeeded);
    let provision = first.provision.as_ref().unwrap();
    assert!(provision.namespace_created);
    assert_eq!(provision.rows_inserted, 3);

    let second = sandbox.execute_query_with_report(&request).await;
    assert_eq!(second.phase, QueryPhase::Succeeded);
    assert!(second.provision.as_ref().unwrap().is_noop());

    assert_eq!(first.result, second.result);
    assert_eq!(first.result.rows()[0]["name"], json!("Ada"));
}

#[tokio::test]
async fn test_rejected_queries_create_nothing() {
    let sandbox = sandbox();
    let cases = [
        ("DROP TABLE customers", ErrorCode::OnlySelectAllowed),
        ("SELECT 1; DROP TABLE customers", ErrorCode::MultipleStatements),
        ("DELETE FROM customers", ErrorCode::OnlySelectAllowed),
        ("UPDATE customers SET name='x'", ErrorCode::OnlySelectAllowed),
        ("SELECT * INTO backup FROM customers", ErrorCode::ProhibitedOperation),
        ("   ", ErrorCode::EmptyQuery),
    ];

    for (sql, expected) in cases {
        let report = sandbox
            .execute_query_with_report(&QueryRequest::new(CUSTOMERS_ASSIGNMENT, sql))
            .await;
        assert_eq!(report.phase, QueryPhase::Rejected, "{}", sql);
        assert_eq!(report.result.error_code(), Some(expected), "{}", sql);
        assert!(report.provision.is_none());
    }

    assert!(sandbox.list_workspaces().is_empty());
    assert_eq!(sandbox.session_pool().idle_count(), 0, "no session was ever created");
}

#[tokio::test]
async fn test_rejection_message_carries_guidance() {
    let sandbox = sandbox();
    let result = query(&sandbox, CUSTOMERS_ASSIGNMENT, "DROP TABLE customers").await;
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["success"], json!(false));
    assert!(value["error"].as_str().unwrap().contains("Only SELECT queries are allowed"));
}

#[tokio::test]
async fn test_unknown_assignment() {
    let sandbox = sandbox();
    let report = sandbox
        .execute_query_with_report(&QueryRequest::new("does-not-exist", "SELECT 1"))
        .await;

    assert_eq!(report.phase, QueryPhase::Failed);
    assert_eq!(report.result.error_code(), Some(ErrorCode::AssignmentNotFound));
    assert!(sandbox.list_workspaces().is_empty());
    assert_eq!(sandbox.session_pool().idle_count(), 0);
}

#[tokio::test]
async fn test_engine_errors_are_classified() {
    let sandbox = sandbox();
    let cases = [
        ("SELECT * FROM nope", ErrorCode::UndefinedTable),
        ("SELECT nope FROM customers", ErrorCode::UndefinedColumn),
        ("SELECT id FROM customers a, customers b", ErrorCode::AmbiguousColumn),
        ("SELECT no_such_fn(1)", ErrorCode::UndefinedFunction),
        ("SELECT 1 / 0", ErrorCode::DivisionByZero),
        ("SELECT CAST('abc' AS INTEGER)", ErrorCode::TypeMismatch),
    ];

    for (sql, expected) in cases {
        let report = sandbox
            .execute_query_with_report(&QueryRequest::new(CUSTOMERS_ASSIGNMENT, sql))
            .await;
        assert_eq!(report.phase, QueryPhase::Failed, "{}", sql);
        assert_eq!(report.result.error_code(), Some(expected), "{}: {:?}", sql, report.result);
    }
}

#[tokio::test]
async fn test_error_messages_hide_internal_namespaces() {
    let sandbox = sandbox();
    let result = query(&sandbox, CUSTOMERS_ASSIGNMENT, "SELECT * FROM nope").await;

    let value = serde_json::to_value(&result).unwrap();
    let message = value["error"].as_str().unwrap();
    assert!(message.contains("nope"), "{}", message);
    for internal in ["sandbox", "workspace", "ws_"] {
        assert!(!message.contains(internal), "{:?} leaked into {:?}", internal, message);
    }
    assert_eq!(value["code"], json!("UNDEFINED_TABLE"));
}

#[tokio::test]
async fn test_result_json_shape_and_rendering() {
    let sandbox = sandbox();
    let result = query(
        &sandbox,
        ORDERS_ASSIGNMENT,
        "SELECT id, amount, paid, placed_at FROM orders ORDER BY id",
    )
    .await;

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["success"], json!(true));
    assert_eq!(value["rowCount"], json!(2));
    assert_eq!(
        value["rows"],
        json!([
            { "id": 1, "amount": 19.99, "paid": true, "placed_at": "2024-03-01T10:30:00" },
            { "id": 2, "amount": 200.5, "paid": false, "placed_at": "2024-03-02T08:00:00" }
        ])
    );
    assert!(value.get("error").is_none());

    let columns = value["columns"].as_array().unwrap();
    assert_eq!(columns[0], json!({ "name": "id", "dataType": "Int64" }));
    assert_eq!(columns[1], json!({ "name": "amount", "dataType": "Float64" }));
    assert_eq!(columns[2], json!({ "name": "paid", "dataType": "Boolean" }));
    assert_eq!(columns[3]["name"], json!("placed_at"));
    assert!(columns[3]["dataType"].as_str().unwrap().starts_with("Timestamp"));
}

#[tokio::test]
async fn test_dates_and_nulls() {
    let sandbox = sandbox();
    let result = query(
        &sandbox,
        CUSTOMERS_ASSIGNMENT,
        "SELECT id, created_at FROM customers ORDER BY id",
    )
    .await;

    assert_eq!(expect_success(&result), 3);
    assert_eq!(result.columns()[1].data_type, "Date32");
    assert_eq!(result.rows()[0]["created_at"], json!("2024-01-15"));
    assert_eq!(result.rows()[2]["created_at"], json!(null));
}

#[tokio::test]
async fn test_cte_and_aggregates() {
    let sandbox = sandbox();
    let result = query(
        &sandbox,
        ORDERS_ASSIGNMENT,
        "WITH paid AS (SELECT * FROM orders WHERE paid) \
         SELECT c.name, count(*) AS paid_orders \
         FROM customers c JOIN paid p ON p.customer_id = c.id GROUP BY c.name",
    )
    .await;

    assert_eq!(expect_success(&result), 1);
    assert_eq!(result.rows()[0]["paid_orders"], json!(1));
}

#[tokio::test]
async fn test_shared_public_schema() {
    let sandbox = sandbox();
    let schema = Arc::new(Schema::new(vec![Field::new("code", DataType::Utf8, true)]));
    sandbox
        .catalog()
        .register_shared_rows(
            "countries",
            schema,
            &[
                vec![ScalarValue::Utf8(Some("NZ".to_string()))],
                vec![ScalarValue::Utf8(Some("IN".to_string()))],
            ],
        )
        .unwrap();

    for assignment in [CUSTOMERS_ASSIGNMENT, ORDERS_ASSIGNMENT] {
        let result = query(&sandbox, assignment, "SELECT code FROM public.countries").await;
        assert_eq!(expect_success(&result), 2);
    }

    // Unqualified names only resolve in the workspace
    let unqualified = query(&sandbox, CUSTOMERS_ASSIGNMENT, "SELECT * FROM countries").await;
    assert_eq!(unqualified.error_code(), Some(ErrorCode::UndefinedTable));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_statement_timeout() {
    let mut config = test_config();
    config.pool.max_sessions = 1;
    config.pool.acquire_timeout_ms = 10_000;
    config.execution.statement_timeout_ms = 50;
    let sandbox = sandbox_with(&config, store());

    let schema = Arc::new(Schema::new(vec![Field::new("n", DataType::Int64, false)]));
    let rows: Vec<Vec<ScalarValue>> =
        (0..50_000).map(|n| vec![ScalarValue::Int64(Some(n))]).collect();
    sandbox.catalog().register_shared_rows("big", schema, &rows).unwrap();

    let started = Instant::now();
    let report = sandbox
        .execute_query_with_report(&QueryRequest::new(
            CUSTOMERS_ASSIGNMENT,
            "SELECT count(*) FROM public.big a JOIN public.big b ON a.n % 7 = b.n % 7",
        ))
        .await;

    assert_eq!(report.result.error_code(), Some(ErrorCode::StatementTimeout));
    assert_eq!(report.phase, QueryPhase::Failed);
    assert!(started.elapsed() < Duration::from_secs(5), "took {:?}", started.elapsed());

    // The aborted query gave its only session back
    let next = query(&sandbox, CUSTOMERS_ASSIGNMENT, "SELECT count(*) AS n FROM customers").await;
    assert_eq!(expect_success(&next), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_timed_out_query_stops_running() {
    let mut config = test_config();
    config.execution.statement_timeout_ms = 100;
    let sandbox = sandbox_with(&config, store());
    sandbox.provision(&AssignmentId::new(CUSTOMERS_ASSIGNMENT)).await.unwrap();

    let metrics = tokio::runtime::Handle::current().metrics();
    let baseline = metrics.num_alive_tasks();

    let result = query(
        &sandbox,
        CUSTOMERS_ASSIGNMENT,
        "SELECT count(*) FROM generate_series(1, 100000) a \
         JOIN generate_series(1, 100000) b ON a.value % 3 = b.value % 3",
    )
    .await;
    assert_eq!(result.error_code(), Some(ErrorCode::StatementTimeout));

    // Every task the plan spawned has to wind down, not keep a core busy
    let deadline = Instant::now() + Duration::from_secs(3);
    while metrics.num_alive_tasks() > baseline && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(
        metrics.num_alive_tasks() <= baseline,
        "{} tasks still running after the timeout (baseline {})",
        metrics.num_alive_tasks(),
        baseline
    );
}

#[tokio::test]
async fn test_result_row_cap() {
    let mut config = test_config();
    config.execution.max_result_rows = 1_000;
    config.datafusion.memory_limit = 1024 * 1024;
    let sandbox = sandbox_with(&config, store());

    let report = sandbox
        .execute_query_with_report(&QueryRequest::new(
            CUSTOMERS_ASSIGNMENT,
            "SELECT value, value * 2 AS d FROM generate_series(1, 2000000)",
        ))
        .await;
    assert_eq!(report.phase, QueryPhase::Failed);
    assert_eq!(report.result.error_code(), Some(ErrorCode::ResourcesExhausted));
    assert!(report.result.rows().is_empty());

    let value = serde_json::to_value(&report.result).unwrap();
    assert!(value["error"].as_str().unwrap().contains("more than 1000 rows"));

    // Exactly at the cap is fine
    let at_cap = query(&sandbox, CUSTOMERS_ASSIGNMENT, "SELECT value FROM generate_series(1, 1000)").await;
    assert_eq!(expect_success(&at_cap), 1_000);
}

#[tokio::test]
async fn test_pool_exhaustion() {
    let mut config = test_config();
    config.pool.max_sessions = 1;
    config.pool.acquire_timeout_ms = 50;
    let sandbox = sandbox_with(&config, store());

    let held = sandbox.session_pool().acquire().await.unwrap();
    let report = sandbox
        .execute_query_with_report(&QueryRequest::new(CUSTOMERS_ASSIGNMENT, "SELECT 1"))
        .await;
    assert_eq!(report.phase, QueryPhase::Failed);
    assert_eq!(report.result.error_code(), Some(ErrorCode::PoolExhausted));

    drop(held);
    let retry = query(&sandbox, CUSTOMERS_ASSIGNMENT, "SELECT 1").await;
    assert_eq!(expect_success(&retry), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_queries_share_one_workspace() {
    let sandbox = Arc::new(sandbox());

    let mut handles = Vec::new();
    for i in 0..12 {
        let sandbox = sandbox.clone();
        let assignment = if i % 2 == 0 { CUSTOMERS_ASSIGNMENT } else { ORDERS_ASSIGNMENT };
        handles.push(tokio::spawn(async move {
            query(&sandbox, assignment, "SELECT count(*) AS n FROM customers").await
        }));
    }

    for handle in handles {
        let result = handle.await.unwrap();
        assert_eq!(expect_success(&result), 1);
    }
    assert_eq!(sandbox.list_workspaces().len(), 2);
    assert!(sandbox.session_pool().idle_count() <= 4);
}

#[tokio::test]
async fn test_explicit_provision_and_listing() {
    let sandbox = sandbox();
    let report = sandbox.provision(&AssignmentId::new(ORDERS_ASSIGNMENT)).await.unwrap();
    assert_eq!(report.tables_created, vec!["customers".to_string(), "orders".to_string()]);

    let listed = sandbox.list_workspaces();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].assignment_id, ORDERS_ASSIGNMENT);
    assert_eq!(listed[0].tables, vec!["customers".to_string(), "orders".to_string()]);

    let missing = sandbox.provision(&AssignmentId::new("nope")).await.unwrap_err();
    assert_eq!(missing.code(), ErrorCode::AssignmentNotFound);
}
