//! Sandbox lifecycle helpers.
//!
//! Loads the configuration, builds the assignment store and the
//! [`SqlSandbox`], keeping `main.rs` a thin orchestrator.

use anyhow::{Context, Result};
use ciphersql_configs::SandboxConfig;
use ciphersql_core::assignments::InMemoryAssignmentStore;
use ciphersql_core::SqlSandbox;
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;

/// Components shared by every command.
pub struct SandboxComponents {
    pub store: Arc<InMemoryAssignmentStore>,
    pub sandbox: Arc<SqlSandbox>,
}

/// Load `path`, or defaults when the file does not exist, then apply
/// `CIPHERSQL_*` environment overrides.
pub fn load_config(path: &Path) -> Result<SandboxConfig> {
    SandboxConfig::load(path).with_context(|| format!("Failed to load {}", path.display()))
}

/// Build the assignment store and the sandbox.
pub fn bootstrap(config: &SandboxConfig) -> Result<SandboxComponents> {
    let phase_start = std::time::Instant::now();

    let store = match config.assignments.seed_file.as_deref() {
        Some(seed_file) => Arc::new(
            InMemoryAssignmentStore::load_from_file(seed_file)
                .with_context(|| format!("Failed to load assignments from {}", seed_file))?,
        ),
        None => {
            warn!(
                "⚠️  No assignment seed file configured; \
                 every query will report ASSIGNMENT_NOT_FOUND"
            );
            Arc::new(InMemoryAssignmentStore::new())
        },
    };

    let sandbox = SqlSandbox::from_config(config, store.clone())
        .map_err(|e| anyhow::anyhow!("Failed to initialize sandbox: {}", e))?;

    info!(
        "Sandbox bootstrapped with {} assignments ({:.2}ms)",
        store.len(),
        phase_start.elapsed().as_secs_f64() * 1000.0
    );

    Ok(SandboxComponents {
        store,
        sandbox: Arc::new(sandbox),
    })
}
