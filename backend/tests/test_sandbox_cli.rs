//! CLI command tests
//!
//! Tests cover:
//! - Bootstrapping from a config with a seed file
//! - query / validate / provision / drop-workspace / workspaces commands
//! - The stdin shell against one sandbox

use ciphersql_configs::SandboxConfig;
use ciphersql_sandbox::cli::Command;
use ciphersql_sandbox::commands::{execute, run_shell};
use ciphersql_sandbox::lifecycle::{bootstrap, load_config, SandboxComponents};
use serde_json::{json, Value as JsonValue};
use std::io::{Cursor, Write};
use tempfile::{NamedTempFile, TempDir};

const SEED: &str = r#"[
    {
        "_id": "65a1",
        "title": "Find All Customers",
        "sampleTables": [{
            "tableName": "customers",
            "columns": [
                { "columnName": "id", "dataType": "INTEGER" },
                { "columnName": "email", "dataType": "VARCHAR" }
            ],
            "rows": [
                { "id": 1, "email": "ada@example.com" },
                { "id": 2, "email": "grace@example.com" },
                { "id": 3, "email": "linus@kernel.org" }
            ]
        }]
    },
    {
        "_id": "65a2",
        "sampleTables": [{
            "tableName": "products",
            "columns": [{ "columnName": "sku", "dataType": "TEXT" }],
            "rows": [{ "sku": "A-1" }]
        }]
    }
]"#;

fn components() -> (SandboxComponents, NamedTempFile) {
    let mut seed = NamedTempFile::new().unwrap();
    seed.write_all(SEED.as_bytes()).unwrap();

    let mut config = SandboxConfig::default();
    config.assignments.seed_file = Some(seed.path().display().to_string());
    (bootstrap(&config).unwrap(), seed)
}

#[tokio::test]
async fn test_bootstrap_loads_seed_file() {
    let (components, _seed) = components();
    assert_eq!(components.store.len(), 2);
}

#[tokio::test]
async fn test_bootstrap_without_seed_file() {
    let components = bootstrap(&SandboxConfig::default()).unwrap();
    assert!(components.store.is_empty());

    let value = execute(
        &components,
        Command::Query {
            assignment: "65a1".to_string(),
            sql: "SELECT 1".to_string(),
            report: false,
        },
    )
    .await
    .unwrap();
    assert_eq!(value["code"], json!("ASSIGNMENT_NOT_FOUND"));
}

#[test]
fn test_bootstrap_reports_missing_seed_file() {
    let mut config = SandboxConfig::default();
    config.assignments.seed_file = Some("/definitely/not/here.json".to_string());
    assert!(bootstrap(&config).is_err());
}

#[test]
fn test_load_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[pool]\nmax_sessions = 3\n").unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.pool.max_sessions, 3);
    assert_eq!(config.execution.statement_timeout_ms, 5000);
}

#[tokio::test]
async fn test_query_command() {
    let (components, _seed) = components();
    let value = execute(
        &components,
        Command::Query {
            assignment: "65a1".to_string(),
            sql: "SELECT * FROM customers WHERE email LIKE '%@example.com'".to_string(),
            report: false,
        },
    )
    .await
    .unwrap();

    assert_eq!(value["success"], json!(true));
    assert_eq!(value["rowCount"], json!(2));
}

#[tokio::test]
async fn test_query_report() {
    let (components, _seed) = components();
    let value = execute(
        &components,
        Command::Query {
            assignment: "65a1".to_string(),
            sql: "SELECT count(*) AS n FROM customers".to_string(),
            report: true,
        },
    )
    .await
    .unwrap();

    assert_eq!(value["phase"], json!("succeeded"));
    assert_eq!(value["provision"]["namespaceCreated"], json!(true));
    assert_eq!(value["result"]["rows"][0]["n"], json!(3));
}

#[tokio::test]
async fn test_validate_command() {
    let (components, _seed) = components();

    let admitted = execute(&components, Command::Validate { sql: "SELECT 1".to_string() })
        .await
        .unwrap();
    assert_eq!(admitted["admitted"], json!(true));

    let rejected = execute(
        &components,
        Command::Validate {
            sql: "DROP TABLE customers".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(rejected["admitted"], json!(false));
    assert_eq!(rejected["code"], json!("ONLY_SELECT_ALLOWED"));
}

#[tokio::test]
async fn test_provision_all_then_list_and_drop() {
    let (components, _seed) = components();

    let provisioned = execute(&components, Command::Provision { assignment: None })
        .await
        .unwrap();
    let entries = provisioned.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e["success"] == json!(true)));

    let listed = execute(&components, Command::Workspaces).await.unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 2);

    let dropped = execute(
        &components,
        Command::DropWorkspace {
            assignment: "65a2".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(dropped["dropped"], json!(true));

    let listed = execute(&components, Command::Workspaces).await.unwrap();
    assert_eq!(listed[0]["assignmentId"], json!("65a1"));
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_provision_unknown_assignment() {
    let (components, _seed) = components();
    let value = execute(
        &components,
        Command::Provision {
            assignment: Some("missing".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(value[0]["success"], json!(false));
    assert_eq!(value[0]["code"], json!("ASSIGNMENT_NOT_FOUND"));
}

#[tokio::test]
async fn test_shell_session() {
    let (components, _seed) = components();
    let script = "\
SELECT 1
\\use 65a1
SELECT id FROM customers ORDER BY id
\\validate DELETE FROM customers
\\workspaces
\\drop
\\workspaces
\\bogus
\\quit
SELECT 'never runs'
";
    let mut output = Vec::new();
    run_shell(&components, None, Cursor::new(script), &mut output, false)
        .await
        .unwrap();

    let lines: Vec<JsonValue> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(lines.len(), 8);
    assert!(lines[0]["error"].as_str().unwrap().contains("No assignment selected"));
    assert_eq!(lines[1]["assignmentId"], json!("65a1"));
    assert_eq!(lines[2]["rowCount"], json!(3));
    assert_eq!(lines[3]["admitted"], json!(false));
    assert_eq!(lines[4].as_array().unwrap().len(), 1);
    assert_eq!(lines[5]["dropped"], json!(true));
    assert!(lines[6].as_array().unwrap().is_empty());
    assert!(lines[7]["error"].as_str().unwrap().contains("Unknown command"));
}
