//! QueryExecutor: run one admitted query against one workspace.
//!
//! The query runs on a spawned task that owns the pooled session. The
//! physical plan is wrapped node by node in `CooperativeExec`, so every
//! operator gives control back to the runtime regularly. When the statement
//! timeout fires the task is aborted and the abort reaches the plan at its
//! next yield point. Dropping the task drops the session guard with it,
//! returning the session to the pool.
//!
//! Batches are streamed and counted against `max_result_rows`. Translation
//! to JSON rows happens inside the same timed task. The engine runs with
//! DDL, DML and session statements disabled.

use crate::error::{ErrorCode, ExecutionError, SandboxError};
use crate::models::QueryResult;
use crate::sql::{translate_output, SessionPool};
use ciphersql_sql::AdmittedQuery;
use datafusion::arrow::datatypes::SchemaRef;
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::catalog::SchemaProvider;
use datafusion::common::tree_node::{Transformed, TreeNode};
use datafusion::error::{DataFusionError, Result as DataFusionResult};
use datafusion::execution::context::{SQLOptions, SessionContext};
use datafusion::physical_plan::coop::CooperativeExec;
use datafusion::physical_plan::{execute_stream, ExecutionPlan};
use futures_util::StreamExt;
use std::sync::Arc;
use std::time::Duration;

/// How long an aborted query gets to unwind before we stop waiting for it.
const CANCEL_GRACE: Duration = Duration::from_secs(1);

/// Engine output: the result schema plus the collected batches.
#[derive(Debug, Clone)]
pub struct ExecutionOutput {
    pub schema: SchemaRef,
    pub batches: Vec<RecordBatch>,
}

impl ExecutionOutput {
    pub fn row_count(&self) -> usize {
        self.batches.iter().map(|b| b.num_rows()).sum()
    }
}

#[derive(Debug, Clone)]
pub struct QueryExecutor {
    pool: SessionPool,
    statement_timeout: Duration,
    max_result_rows: usize,
}

impl QueryExecutor {
    pub fn new(pool: SessionPool, statement_timeout: Duration, max_result_rows: usize) -> Self {
        Self {
            pool,
            statement_timeout,
            max_result_rows,
        }
    }

    pub fn pool(&self) -> &SessionPool {
        &self.pool
    }

    pub fn statement_timeout(&self) -> Duration {
        self.statement_timeout
    }

    pub fn max_result_rows(&self) -> usize {
        self.max_result_rows
    }

    /// Execute `query` with unqualified names resolving in `workspace`.
    pub async fn execute(
        &self,
        query: &AdmittedQuery,
        workspace: Arc<dyn SchemaProvider>,
        public: Arc<dyn SchemaProvider>,
    ) -> Result<QueryResult, SandboxError> {
        let session = self.pool.acquire().await?;
        session
            .bind(workspace, public)
            .map_err(|e| SandboxError::Internal(format!("Failed to bind session: {}", e)))?;

        let sql = query.sql().to_string();
        let max_rows = self.max_result_rows;
        let mut handle = tokio::spawn(async move {
            let output = collect_bounded(&session, &sql, max_rows).await?;
            translate_output(&output)
                .map_err(|e| SandboxError::Internal(format!("Failed to translate result: {}", e)))
        });

        match tokio::time::timeout(self.statement_timeout, &mut handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(SandboxError::Internal(format!(
                "Query task failed: {}",
                join_error
            ))),
            Err(_) => {
                handle.abort();
                if tokio::time::timeout(CANCEL_GRACE, handle).await.is_err() {
                    log::warn!("⚠️  Cancelled query still running after {:?}", CANCEL_GRACE);
                }
                log::warn!(
                    "⏱️  Query cancelled after statement timeout of {} ms",
                    self.statement_timeout.as_millis()
                );
                Err(ExecutionError::new(
                    ErrorCode::StatementTimeout,
                    format!(
                        "Query exceeded the statement timeout of {} ms and was cancelled.",
                        self.statement_timeout.as_millis()
                    ),
                )
                .into())
            },
        }
    }
}

/// Plan `sql`, then stream its batches until done or past `max_rows`.
async fn collect_bounded(
    ctx: &SessionContext,
    sql: &str,
    max_rows: usize,
) -> Result<ExecutionOutput, SandboxError> {
    let df = ctx.sql_with_options(sql, read_only_options()).await.map_err(engine_error)?;
    let schema = df.schema().inner().clone();
    let task_ctx = Arc::new(df.task_ctx());
    let plan = df.create_physical_plan().await.map_err(engine_error)?;
    let plan = cooperative_plan(plan).map_err(engine_error)?;

    let mut stream = execute_stream(plan, task_ctx).map_err(engine_error)?;
    let mut batches = Vec::new();
    let mut rows = 0usize;
    while let Some(batch) = stream.next().await {
        let batch = batch.map_err(engine_error)?;
        rows += batch.num_rows();
        if rows > max_rows {
            log::debug!("📏 Query stopped after exceeding {} result rows", max_rows);
            return Err(ExecutionError::new(
                ErrorCode::ResourcesExhausted,
                format!(
                    "Query returned more than {} rows. Add a LIMIT or a narrower WHERE clause.",
                    max_rows
                ),
            )
            .into());
        }
        batches.push(batch);
    }

    Ok(ExecutionOutput { schema, batches })
}

/// Wrap every node so that no operator can hold the worker thread
/// indefinitely between yields.
fn cooperative_plan(plan: Arc<dyn ExecutionPlan>) -> DataFusionResult<Arc<dyn ExecutionPlan>> {
    plan.transform_up(|node| {
        let wrapped: Arc<dyn ExecutionPlan> = Arc::new(CooperativeExec::new(node));
        Ok(Transformed::yes(wrapped))
    })
    .map(|transformed| transformed.data)
}

fn engine_error(e: DataFusionError) -> SandboxError {
    let error = classify_datafusion_error(&e);
    log::debug!("❌ Query failed [{}]: {}", error.code, e);
    error.into()
}

fn read_only_options() -> SQLOptions {
    SQLOptions::new()
        .with_allow_ddl(false)
        .with_allow_dml(false)
        .with_allow_statements(false)
}

/// Map an engine error to a stable code and a scrubbed message.
pub fn classify_datafusion_error(e: &DataFusionError) -> ExecutionError {
    let root = e.find_root();
    let message = scrub_message(&root.to_string());
    let msg = message.to_lowercase();

    let code = if matches!(root, DataFusionError::SQL(..)) {
        ErrorCode::SyntaxError
    } else if msg.contains("ddl not supported")
        || msg.contains("dml not supported")
        || msg.contains("statement not supported")
    {
        ErrorCode::ReadOnlyViolation
    } else if matches!(root, DataFusionError::ResourcesExhausted(_)) {
        ErrorCode::ResourcesExhausted
    } else if msg.contains("table") && msg.contains("not found") {
        ErrorCode::UndefinedTable
    } else if msg.contains("no field named") {
        ErrorCode::UndefinedColumn
    } else if msg.contains("ambiguous reference") {
        ErrorCode::AmbiguousColumn
    } else if msg.contains("invalid function") {
        ErrorCode::UndefinedFunction
    } else if msg.contains("divide by zero") {
        ErrorCode::DivisionByZero
    } else if msg.contains("cannot cast") || msg.contains("cast error") || msg.contains("coerce") {
        ErrorCode::TypeMismatch
    } else if matches!(root, DataFusionError::NotImplemented(_))
        || msg.contains("not supported")
        || msg.contains("unsupported")
    {
        ErrorCode::FeatureNotSupported
    } else {
        ErrorCode::ExecutionFailed
    };

    ExecutionError::new(code, message)
}

/// Remove the internal catalog qualifiers from engine messages. Only the
/// full `sandbox.<schema>.` prefixes are touched.
pub fn scrub_message(message: &str) -> String {
    message
        .replace("sandbox.workspace.", "")
        .replace("sandbox.public.", "public.")
        .trim()
        .to_string()
}
