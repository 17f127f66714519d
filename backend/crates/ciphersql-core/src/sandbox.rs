//! SqlSandbox: the request pipeline.
//!
//! ```text
//! QueryValidator ─► AssignmentStore ─► WorkspaceProvisioner ─► QueryExecutor ─► ResultTranslator
//!   (Validating)     (Provisioning)        (Provisioning)          (Executing)
//! ```
//!
//! The executor translates rows inside its timed task, so the statement
//! timeout covers translation too.
//!
//! Validation and lookup failures return before the engine is touched.
//! Nothing is retried.

use crate::assignments::AssignmentStore;
use crate::catalog::{WorkspaceCatalog, WorkspaceInfo};
use crate::error::{CatalogError, SandboxError};
use crate::models::{ProvisionReport, QueryPhase, QueryReport, QueryRequest, QueryResult};
use crate::sql::{DataFusionSessionFactory, QueryExecutor, SessionPool};
use crate::workspace::WorkspaceProvisioner;
use ciphersql_commons::AssignmentId;
use ciphersql_configs::SandboxConfig;
use ciphersql_sql::{QueryValidator, Verdict};
use datafusion::catalog::TableProvider;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

pub struct SqlSandbox {
    store: Arc<dyn AssignmentStore>,
    provisioner: WorkspaceProvisioner,
    executor: QueryExecutor,
    validator: QueryValidator,
}

impl SqlSandbox {
    pub fn new(
        store: Arc<dyn AssignmentStore>,
        catalog: Arc<WorkspaceCatalog>,
        executor: QueryExecutor,
        validator: QueryValidator,
    ) -> Self {
        Self {
            store,
            provisioner: WorkspaceProvisioner::new(catalog),
            executor,
            validator,
        }
    }

    /// Build the sandbox from `[pool]`, `[execution]` and `[datafusion]`.
    pub fn from_config(
        config: &SandboxConfig,
        store: Arc<dyn AssignmentStore>,
    ) -> Result<Self, SandboxError> {
        let factory = DataFusionSessionFactory::new(&config.datafusion).map_err(|e| {
            SandboxError::Internal(format!("Failed to create DataFusion runtime: {}", e))
        })?;
        let pool = SessionPool::new(
            factory,
            config.pool.max_sessions,
            Duration::from_millis(config.pool.acquire_timeout_ms),
        );
        let executor = QueryExecutor::new(
            pool,
            Duration::from_millis(config.execution.statement_timeout_ms),
            config.execution.max_result_rows,
        );

        log::info!(
            "🧪 SQL sandbox ready: max_sessions={}, statement_timeout_ms={}, max_result_rows={}, memory_limit={}",
            config.pool.max_sessions,
            config.execution.statement_timeout_ms,
            config.execution.max_result_rows,
            config.datafusion.memory_limit
        );

        Ok(Self::new(
            store,
            Arc::new(WorkspaceCatalog::new()),
            executor,
            QueryValidator::new(config.execution.max_query_length),
        ))
    }

    /// ExecuteQuery: validate, provision on first use, execute, translate.
    pub async fn execute_query(&self, request: &QueryRequest) -> QueryResult {
        self.execute_query_with_report(request).await.result
    }

    /// Same as [`execute_query`](Self::execute_query), plus the terminal
    /// phase and what provisioning did.
    pub async fn execute_query_with_report(&self, request: &QueryRequest) -> QueryReport {
        let span = tracing::info_span!(
            "sandbox.query",
            assignment_id = %request.assignment_id,
            caller_id = request.caller_id.as_deref().unwrap_or("-"),
            phase = tracing::field::Empty,
            rows = tracing::field::Empty,
        );

        async {
            let started = Instant::now();
            let mut phase = QueryPhase::Validating;
            let mut provision = None;

            let result = match self.run(request, &mut phase, &mut provision).await {
                Ok(result) => {
                    phase = QueryPhase::Succeeded;
                    tracing::Span::current().record("rows", result.row_count());
                    result
                },
                Err(e) => {
                    phase = match phase {
                        QueryPhase::Validating => QueryPhase::Rejected,
                        _ => QueryPhase::Failed,
                    };
                    self.log_failure(request, &e);
                    QueryResult::from(&e)
                },
            };

            tracing::Span::current().record("phase", phase.as_str());
            QueryReport {
                result,
                phase,
                provision,
                took_ms: started.elapsed().as_secs_f64() * 1000.0,
            }
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        request: &QueryRequest,
        phase: &mut QueryPhase,
        provision: &mut Option<ProvisionReport>,
    ) -> Result<QueryResult, SandboxError> {
        let query = self.validator.validate(&request.raw_query).into_result()?;

        *phase = QueryPhase::Provisioning;
        let assignment = self
            .store
            .get_by_id(&request.assignment_id)
            .await?
            .ok_or_else(|| SandboxError::AssignmentNotFound(request.assignment_id.clone()))?;
        let (workspace, report) = self.provisioner.provision(&assignment).await?;
        *provision = Some(report);

        *phase = QueryPhase::Executing;
        self.executor
            .execute(&query, workspace.schema(), self.catalog().public_schema())
            .await
    }

    fn log_failure(&self, request: &QueryRequest, e: &SandboxError) {
        match e {
            SandboxError::Validation(_) | SandboxError::Execution(_) => {
                log::debug!(
                    "Query for assignment {} failed [{}]: {}",
                    request.assignment_id,
                    e.code(),
                    e
                );
            },
            SandboxError::AssignmentNotFound(_) => {
                log::warn!("❓ Assignment {} not found", request.assignment_id);
            },
            SandboxError::Provisioning(_)
            | SandboxError::Pool(_)
            | SandboxError::Store(_)
            | SandboxError::Internal(_) => {
                log::error!(
                    "❌ Query for assignment {} failed [{}]: {}",
                    request.assignment_id,
                    e.code(),
                    e
                );
            },
        }
    }

    /// Classify a query without running it.
    pub fn validate(&self, raw_query: &str) -> Verdict {
        self.validator.validate(raw_query)
    }

    /// Provision an assignment's workspace ahead of the first query.
    pub async fn provision(
        &self,
        assignment_id: &AssignmentId,
    ) -> Result<ProvisionReport, SandboxError> {
        let assignment = self
            .store
            .get_by_id(assignment_id)
            .await?
            .ok_or_else(|| SandboxError::AssignmentNotFound(assignment_id.clone()))?;
        let (_, report) = self.provisioner.provision(&assignment).await?;
        Ok(report)
    }

    /// Admin cleanup. The next query re-provisions from the current
    /// definition.
    pub fn drop_workspace(&self, assignment_id: &AssignmentId) -> bool {
        self.provisioner.drop_workspace(assignment_id)
    }

    pub fn list_workspaces(&self) -> Vec<WorkspaceInfo> {
        self.provisioner.list_workspaces()
    }

    /// Make `table` readable from every query as `public.<name>`.
    pub fn register_shared_table(
        &self,
        name: &str,
        table: Arc<dyn TableProvider>,
    ) -> Result<(), CatalogError> {
        self.catalog().register_shared_table(name, table)
    }

    pub fn catalog(&self) -> &Arc<WorkspaceCatalog> {
        self.provisioner.catalog()
    }

    pub fn session_pool(&self) -> &SessionPool {
        self.executor.pool()
    }
}
