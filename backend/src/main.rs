// CipherSQL sandbox entrypoint
//!
//! Configuration, logging and bootstrap live in dedicated modules so this
//! file remains a thin orchestrator.

use anyhow::Result;
use ciphersql_sandbox::cli::{Cli, Command};
use ciphersql_sandbox::{commands, lifecycle, logging};
use clap::Parser;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration (fallback to defaults when config file missing)
    let mut config = match lifecycle::load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("❌ FATAL: {:#}", e);
            std::process::exit(1);
        },
    };
    if let Some(path) = &cli.assignments {
        config.assignments.seed_file = Some(path.display().to_string());
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    config.validate()?;

    // Logging before any other side effects
    logging::init_logging(&config.logging)?;

    info!(
        "CipherSQL sandbox v{} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_COMMIT_HASH")
    );

    let components = lifecycle::bootstrap(&config)?;

    match cli.command {
        Command::Shell { assignment } => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            commands::run_shell(&components, assignment, stdin.lock(), stdout.lock(), cli.pretty)
                .await
        },
        command => {
            let value = commands::execute(&components, command).await?;
            commands::write_json(&mut std::io::stdout().lock(), &value, cli.pretty)
        },
    }
}
