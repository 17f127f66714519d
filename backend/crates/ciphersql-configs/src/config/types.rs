use super::defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Main sandbox configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SandboxConfig {
    #[serde(default)]
    pub pool: PoolSettings,
    #[serde(default)]
    pub execution: ExecutionSettings,
    #[serde(default)]
    pub datafusion: DataFusionSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub assignments: AssignmentSettings,
}

/// Session pool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSettings {
    /// Maximum number of sessions checked out at once (default: 20)
    #[serde(default = "default_pool_max_sessions")]
    pub max_sessions: usize,

    /// How long a request waits for a free session before failing (default: 2000ms)
    #[serde(default = "default_pool_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

/// Statement execution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionSettings {
    /// Per-statement wall-clock limit (default: 5000ms)
    #[serde(default = "default_statement_timeout_ms")]
    pub statement_timeout_ms: u64,

    /// Longest raw query text accepted by the validator, in bytes (default: 64KB)
    #[serde(default = "default_max_query_length")]
    pub max_query_length: usize,

    /// Rows a single query may return before it fails with
    /// RESOURCES_EXHAUSTED (default: 10000)
    #[serde(default = "default_max_result_rows")]
    pub max_result_rows: usize,
}

/// DataFusion settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataFusionSettings {
    /// Memory limit shared by all sandbox queries in bytes (default: 256MB)
    #[serde(default = "default_datafusion_memory_limit")]
    pub memory_limit: usize,

    /// Partitions per query plan (default: 4)
    #[serde(default = "default_datafusion_target_partitions")]
    pub target_partitions: usize,

    /// Batch size for record processing (default: 8192)
    #[serde(default = "default_datafusion_batch_size")]
    pub batch_size: usize,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Directory for log files (default: "./logs")
    #[serde(default = "default_logs_path")]
    pub logs_path: String,
    #[serde(default = "default_true")]
    pub log_to_console: bool,
    /// "compact", "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Optional per-target log level overrides
    /// [logging.targets]
    /// datafusion = "info"
    /// ciphersql_core = "debug"
    #[serde(default)]
    pub targets: HashMap<String, String>,
}

/// Assignment source settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AssignmentSettings {
    /// JSON file holding an array of assignment documents.
    /// When unset the sandbox starts with no assignments.
    #[serde(default)]
    pub seed_file: Option<String>,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_sessions: default_pool_max_sessions(),
            acquire_timeout_ms: default_pool_acquire_timeout_ms(),
        }
    }
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            statement_timeout_ms: default_statement_timeout_ms(),
            max_query_length: default_max_query_length(),
            max_result_rows: default_max_result_rows(),
        }
    }
}

impl Default for DataFusionSettings {
    fn default() -> Self {
        Self {
            memory_limit: default_datafusion_memory_limit(),
            target_partitions: default_datafusion_target_partitions(),
            batch_size: default_datafusion_batch_size(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            logs_path: default_logs_path(),
            log_to_console: true,
            format: default_log_format(),
            targets: HashMap::new(),
        }
    }
}
