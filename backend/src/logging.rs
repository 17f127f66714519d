//! Log output for the sandbox binary.
//!
//! The library crates only use the `log` facade. `LogTracer` forwards those
//! records into the `tracing` subscriber built here so they are printed with
//! the `sandbox.query` span they happened in. Console output goes to stderr
//! because stdout carries the JSON results.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::path::Path;

use ciphersql_configs::LoggingSettings;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Engine crates that are chatty at `info` and below.
const ENGINE_TARGETS: [&str; 3] = ["datafusion", "sqlparser", "arrow"];

/// EnvFilter directives: the base level, engine crates capped at `warn`,
/// then per-target overrides in name order.
pub fn filter_directives(level: &str, targets: &HashMap<String, String>) -> String {
    let mut overrides: Vec<_> = targets.iter().collect();
    overrides.sort();

    std::iter::once(level.to_string())
        .chain(ENGINE_TARGETS.iter().map(|target| format!("{}=warn", target)))
        .chain(overrides.into_iter().map(|(target, lvl)| format!("{}={}", target, lvl)))
        .collect::<Vec<_>>()
        .join(",")
}

fn env_filter(settings: &LoggingSettings) -> anyhow::Result<EnvFilter> {
    let directives = filter_directives(&settings.level, &settings.targets);
    EnvFilter::try_new(&directives)
        .map_err(|e| anyhow::anyhow!("Invalid log filter '{}': {}", directives, e))
}

/// Install the global subscriber: an optional stderr layer plus a file
/// layer at `<logs_path>/sandbox.log` in the configured format.
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    let file_path = Path::new(&settings.logs_path).join("sandbox.log");
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let log_file = OpenOptions::new().create(true).append(true).open(&file_path)?;

    tracing_log::LogTracer::init().ok();

    let console = settings.log_to_console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::CLOSE)
            .compact()
    });
    let console = match console {
        Some(layer) => Some(layer.with_filter(env_filter(settings)?)),
        None => None,
    };

    let file = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(log_file)
        .with_span_events(FmtSpan::CLOSE);
    let file = match settings.format.as_str() {
        "json" => file.json().with_filter(env_filter(settings)?).boxed(),
        "pretty" => file.pretty().with_filter(env_filter(settings)?).boxed(),
        _ => file.compact().with_filter(env_filter(settings)?).boxed(),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))?;

    log::debug!("Logging to {}", file_path.display());
    Ok(())
}
