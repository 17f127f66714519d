// Default value functions

pub fn default_true() -> bool {
    true
}

pub fn default_pool_max_sessions() -> usize {
    20
}

pub fn default_pool_acquire_timeout_ms() -> u64 {
    2000
}

pub fn default_statement_timeout_ms() -> u64 {
    5000
}

pub fn default_max_query_length() -> usize {
    65536 // 64KB
}

pub fn default_max_result_rows() -> usize {
    10_000
}

pub fn default_datafusion_memory_limit() -> usize {
    256 * 1024 * 1024 // 256MB
}

pub fn default_datafusion_target_partitions() -> usize {
    4
}

pub fn default_datafusion_batch_size() -> usize {
    8192
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_logs_path() -> String {
    "./logs".to_string()
}

pub fn default_log_format() -> String {
    "compact".to_string()
}
