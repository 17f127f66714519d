//! Command implementations. Each returns the JSON value to print.

use crate::cli::Command;
use crate::lifecycle::SandboxComponents;
use anyhow::{bail, Result};
use ciphersql_commons::AssignmentId;
use ciphersql_core::models::QueryRequest;
use ciphersql_sql::Verdict;
use serde_json::{json, Value as JsonValue};
use std::io::{BufRead, Write};

pub async fn execute(components: &SandboxComponents, command: Command) -> Result<JsonValue> {
    match command {
        Command::Query {
            assignment,
            sql,
            report,
        } => run_query(components, &assignment, &sql, report).await,
        Command::Validate { sql } => Ok(validate(components, &sql)),
        Command::Provision { assignment } => provision(components, assignment.as_deref()).await,
        Command::DropWorkspace { assignment } => Ok(drop_workspace(components, &assignment)),
        Command::Workspaces => workspaces(components),
        Command::Shell { .. } => bail!("the shell command reads from stdin; use run_shell"),
    }
}

async fn run_query(
    components: &SandboxComponents,
    assignment: &str,
    sql: &str,
    report: bool,
) -> Result<JsonValue> {
    let request = QueryRequest::new(assignment, sql);
    let value = if report {
        serde_json::to_value(components.sandbox.execute_query_with_report(&request).await)?
    } else {
        serde_json::to_value(components.sandbox.execute_query(&request).await)?
    };
    Ok(value)
}

fn validate(components: &SandboxComponents, sql: &str) -> JsonValue {
    match components.sandbox.validate(sql) {
        Verdict::Admitted(query) => json!({ "admitted": true, "sql": query.sql() }),
        Verdict::Rejected(rejection) => json!({
            "admitted": false,
            "code": rejection.code(),
            "error": rejection.message,
        }),
    }
}

async fn provision(components: &SandboxComponents, assignment: Option<&str>) -> Result<JsonValue> {
    let ids = match assignment {
        Some(id) => vec![AssignmentId::new(id)],
        None => components.store.ids(),
    };

    let mut reports = Vec::with_capacity(ids.len());
    for id in ids {
        let entry = match components.sandbox.provision(&id).await {
            Ok(report) => json!({ "assignmentId": id, "success": true, "report": report }),
            Err(e) => json!({
                "assignmentId": id,
                "success": false,
                "error": e.public_message(),
                "code": e.code(),
            }),
        };
        reports.push(entry);
    }
    Ok(JsonValue::Array(reports))
}

fn drop_workspace(components: &SandboxComponents, assignment: &str) -> JsonValue {
    let dropped = components.sandbox.drop_workspace(&AssignmentId::new(assignment));
    json!({ "assignmentId": assignment, "dropped": dropped })
}

fn workspaces(components: &SandboxComponents) -> Result<JsonValue> {
    Ok(serde_json::to_value(components.sandbox.list_workspaces())?)
}

/// Interactive loop: one command or SQL statement per line, one JSON
/// document per output line.
pub async fn run_shell<R: BufRead, W: Write>(
    components: &SandboxComponents,
    initial_assignment: Option<String>,
    input: R,
    mut output: W,
    pretty: bool,
) -> Result<()> {
    let mut current = initial_assignment;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let value = match line.split_once(char::is_whitespace).unwrap_or((line, "")) {
            ("\\quit", _) | ("\\q", _) => break,
            ("\\use", id) if !id.trim().is_empty() => {
                current = Some(id.trim().to_string());
                json!({ "assignmentId": id.trim() })
            },
            ("\\validate", sql) => validate(components, sql),
            ("\\workspaces", _) => workspaces(components)?,
            ("\\provision", id) => {
                let id = non_empty(id).or(current.as_deref());
                match id {
                    Some(id) => provision(components, Some(id)).await?,
                    None => no_assignment(),
                }
            },
            ("\\drop", id) => match non_empty(id).or(current.as_deref()) {
                Some(id) => drop_workspace(components, id),
                None => no_assignment(),
            },
            (command, _) if command.starts_with('\\') => {
                json!({ "error": format!("Unknown command: {}", command) })
            },
            _ => match current.as_deref() {
                Some(id) => run_query(components, id, line, false).await?,
                None => no_assignment(),
            },
        };

        write_json(&mut output, &value, pretty)?;
    }

    Ok(())
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}

fn no_assignment() -> JsonValue {
    json!({ "error": "No assignment selected. Use \\use <assignment id> first." })
}

pub fn write_json<W: Write>(output: &mut W, value: &JsonValue, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *output, value)?;
    } else {
        serde_json::to_writer(&mut *output, value)?;
    }
    writeln!(output)?;
    Ok(())
}
