//! DataFusion session factory
//!
//! Every sandbox session shares one `RuntimeEnv`, so the memory limit from
//! `[datafusion]` bounds all concurrent queries together. Sessions start
//! with no catalogs; [`PooledSession::bind`](super::PooledSession::bind)
//! installs the `sandbox` catalog for the duration of one query.

use crate::catalog::{SANDBOX_CATALOG, WORKSPACE_SCHEMA};
use ciphersql_configs::DataFusionSettings;
use datafusion::error::Result as DataFusionResult;
use datafusion::execution::context::SessionContext;
use datafusion::execution::runtime_env::{RuntimeEnv, RuntimeEnvBuilder};
use datafusion::execution::session_state::SessionStateBuilder;
use datafusion::prelude::SessionConfig;
use std::sync::Arc;

/// DataFusion session factory
#[derive(Debug, Clone)]
pub struct DataFusionSessionFactory {
    runtime: Arc<RuntimeEnv>,
    target_partitions: usize,
    batch_size: usize,
}

impl DataFusionSessionFactory {
    /// Create a factory with a shared, memory-limited runtime.
    pub fn new(settings: &DataFusionSettings) -> DataFusionResult<Self> {
        let runtime = RuntimeEnvBuilder::new()
            .with_memory_limit(settings.memory_limit, 1.0)
            .build_arc()?;

        Ok(Self {
            runtime,
            target_partitions: settings.target_partitions,
            batch_size: settings.batch_size,
        })
    }

    fn session_config(&self) -> SessionConfig {
        SessionConfig::new()
            .with_create_default_catalog_and_schema(false)
            .with_information_schema(false)
            .with_default_catalog_and_schema(SANDBOX_CATALOG, WORKSPACE_SCHEMA)
            .with_target_partitions(self.target_partitions)
            .with_batch_size(self.batch_size)
    }

    /// Create an unbound session.
    pub fn create_session(&self) -> SessionContext {
        let state = SessionStateBuilder::new()
            .with_config(self.session_config())
            .with_runtime_env(self.runtime.clone())
            .with_default_features()
            .build();

        SessionContext::new_with_state(state)
    }

    pub fn runtime(&self) -> &Arc<RuntimeEnv> {
        &self.runtime
    }
}
