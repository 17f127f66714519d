//! Shared fixtures for sandbox integration tests.
#![allow(dead_code)]

use ciphersql_commons::{AssignmentDefinition, ColumnDefinition, SampleTableDefinition};
use ciphersql_configs::SandboxConfig;
use ciphersql_core::assignments::InMemoryAssignmentStore;
use ciphersql_core::models::{QueryRequest, QueryResult};
use ciphersql_core::SqlSandbox;
use serde_json::json;
use std::sync::Arc;

pub const CUSTOMERS_ASSIGNMENT: &str = "65a1f3c2e4b0";
pub const ORDERS_ASSIGNMENT: &str = "65a1f3c2e4b1";

/// `customers(id, name, email, created_at)` with three rows, two of them
/// on `@example.com`.
pub fn customers_assignment() -> AssignmentDefinition {
    let customers = SampleTableDefinition::new(
        "customers",
        vec![
            ColumnDefinition::new("id", "INTEGER"),
            ColumnDefinition::new("name", "TEXT"),
            ColumnDefinition::new("email", "VARCHAR"),
            ColumnDefinition::new("created_at", "DATE"),
        ],
    )
    .with_row(json!({ "id": 1, "name": "Ada", "email": "ada@example.com", "created_at": "2024-01-15" }))
    .with_row(json!({ "id": 2, "name": "Grace", "email": "grace@example.com", "created_at": "2024-02-01" }))
    .with_row(json!({ "id": 3, "name": "Linus", "email": "linus@kernel.org", "created_at": null }));

    AssignmentDefinition::new(CUSTOMERS_ASSIGNMENT, vec![customers]).with_title("Find All Customers")
}

/// A second assignment that also has a `customers` table, with different rows.
pub fn orders_assignment() -> AssignmentDefinition {
    let customers = SampleTableDefinition::new(
        "customers",
        vec![ColumnDefinition::new("id", "INTEGER"), ColumnDefinition::new("name", "TEXT")],
    )
    .with_row(json!({ "id": 10, "name": "Only Customer" }));

    let orders = SampleTableDefinition::new(
        "orders",
        vec![
            ColumnDefinition::new("id", "INTEGER"),
            ColumnDefinition::new("customer_id", "INTEGER"),
            ColumnDefinition::new("amount", "NUMERIC"),
            ColumnDefinition::new("paid", "BOOLEAN"),
            ColumnDefinition::new("placed_at", "TIMESTAMP"),
        ],
    )
    .with_row(json!({ "id": 1, "customer_id": 10, "amount": 19.99, "paid": true, "placed_at": "2024-03-01 10:30:00" }))
    .with_row(json!({ "id": 2, "customer_id": 10, "amount": "200.5", "paid": "no", "placed_at": "2024-03-02T08:00:00" }));

    AssignmentDefinition::new(ORDERS_ASSIGNMENT, vec![customers, orders])
}

pub fn test_config() -> SandboxConfig {
    let mut config = SandboxConfig::default();
    config.pool.max_sessions = 4;
    config.pool.acquire_timeout_ms = 500;
    config.execution.statement_timeout_ms = 10_000;
    config.datafusion.target_partitions = 2;
    config
}

pub fn store() -> Arc<InMemoryAssignmentStore> {
    Arc::new(InMemoryAssignmentStore::from_definitions([
        customers_assignment(),
        orders_assignment(),
    ]))
}

pub fn sandbox_with(config: &SandboxConfig, store: Arc<InMemoryAssignmentStore>) -> SqlSandbox {
    SqlSandbox::from_config(config, store).expect("sandbox")
}

pub fn sandbox() -> SqlSandbox {
    sandbox_with(&test_config(), store())
}

pub async fn query(sandbox: &SqlSandbox, assignment_id: &str, sql: &str) -> QueryResult {
    sandbox.execute_query(&QueryRequest::new(assignment_id, sql)).await
}

/// Unwrap a success, panicking with the failure message otherwise.
pub fn expect_success(result: &QueryResult) -> usize {
    match result {
        QueryResult::Success { row_count, .. } => *row_count,
        QueryResult::Failure { message, code } => panic!("expected success, got {}: {}", code, message),
    }
}
