use super::types::SandboxConfig;
use std::env;
use std::fs;
use std::path::Path;

const VALID_LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
const VALID_LOG_FORMATS: [&str; 3] = ["compact", "pretty", "json"];

impl SandboxConfig {
    /// Load configuration from a TOML file
    ///
    /// Note: Environment overrides are applied separately via `apply_env_overrides()`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        let mut config: SandboxConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))?;

        config.finalize()?;

        Ok(config)
    }

    /// Load `path` if it exists (defaults otherwise), apply environment
    /// overrides, then validate.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let mut config = if path.as_ref().exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides()?;
        config.finalize()?;
        Ok(config)
    }

    /// Apply `CIPHERSQL_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        if let Ok(raw) = env::var("CIPHERSQL_POOL_MAX_SESSIONS") {
            self.pool.max_sessions = raw.parse().map_err(|_| {
                anyhow::anyhow!("Invalid CIPHERSQL_POOL_MAX_SESSIONS value: {}", raw)
            })?;
        }

        if let Ok(raw) = env::var("CIPHERSQL_POOL_ACQUIRE_TIMEOUT_MS") {
            self.pool.acquire_timeout_ms = raw.parse().map_err(|_| {
                anyhow::anyhow!("Invalid CIPHERSQL_POOL_ACQUIRE_TIMEOUT_MS value: {}", raw)
            })?;
        }

        if let Ok(raw) = env::var("CIPHERSQL_STATEMENT_TIMEOUT_MS") {
            self.execution.statement_timeout_ms = raw.parse().map_err(|_| {
                anyhow::anyhow!("Invalid CIPHERSQL_STATEMENT_TIMEOUT_MS value: {}", raw)
            })?;
        }

        if let Ok(raw) = env::var("CIPHERSQL_MAX_RESULT_ROWS") {
            self.execution.max_result_rows = raw.parse().map_err(|_| {
                anyhow::anyhow!("Invalid CIPHERSQL_MAX_RESULT_ROWS value: {}", raw)
            })?;
        }

        if let Ok(level) = env::var("CIPHERSQL_LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }

        if let Ok(val) = env::var("CIPHERSQL_LOG_TO_CONSOLE") {
            let val = val.to_lowercase();
            self.logging.log_to_console = val == "true" || val == "1" || val == "yes";
        }

        if let Ok(path) = env::var("CIPHERSQL_ASSIGNMENTS_FILE") {
            self.assignments.seed_file = if path.trim().is_empty() { None } else { Some(path) };
        }

        Ok(())
    }

    /// Normalize paths and validate.
    ///
    /// Call this after applying environment overrides.
    pub fn finalize(&mut self) -> anyhow::Result<()> {
        self.logging.logs_path = self.logging.logs_path.trim_end_matches('/').to_string();
        if self.logging.logs_path.is_empty() {
            self.logging.logs_path = ".".to_string();
        }

        self.validate()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.pool.max_sessions == 0 {
            return Err(anyhow::anyhow!("pool.max_sessions cannot be 0"));
        }

        if self.pool.acquire_timeout_ms == 0 {
            return Err(anyhow::anyhow!("pool.acquire_timeout_ms cannot be 0"));
        }

        if self.execution.statement_timeout_ms == 0 {
            return Err(anyhow::anyhow!("execution.statement_timeout_ms cannot be 0"));
        }

        if self.execution.max_query_length == 0 {
            return Err(anyhow::anyhow!("execution.max_query_length cannot be 0"));
        }

        if self.execution.max_result_rows == 0 {
            return Err(anyhow::anyhow!("execution.max_result_rows cannot be 0"));
        }

        if self.datafusion.memory_limit == 0 {
            return Err(anyhow::anyhow!("datafusion.memory_limit cannot be 0"));
        }

        if self.datafusion.target_partitions == 0 || self.datafusion.batch_size == 0 {
            return Err(anyhow::anyhow!(
                "datafusion.target_partitions and datafusion.batch_size must be positive"
            ));
        }

        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                VALID_LOG_LEVELS.join(", ")
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                VALID_LOG_FORMATS.join(", ")
            ));
        }

        for (target, level) in &self.logging.targets {
            if !VALID_LOG_LEVELS.contains(&level.as_str()) {
                return Err(anyhow::anyhow!(
                    "Invalid log level '{}' for target '{}'. Must be one of: {}",
                    level,
                    target,
                    VALID_LOG_LEVELS.join(", ")
                ));
            }
        }

        Ok(())
    }
}
