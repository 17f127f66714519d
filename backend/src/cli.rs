use clap::{Parser, Subcommand};
use std::path::PathBuf;

macro_rules! version_string {
    () => {
        concat!(
            env!("CARGO_PKG_VERSION"),
            "\nCommit: ",
            env!("GIT_COMMIT_HASH"),
            " (",
            env!("GIT_BRANCH"),
            ")\nBuilt: ",
            env!("BUILD_DATE")
        )
    };
}

/// CipherSQL sandbox - run learner SQL against assignment workspaces
#[derive(Parser, Debug)]
#[command(name = "ciphersql-sandbox")]
#[command(author = "CipherSQLStudio Team")]
#[command(version = version_string!())]
#[command(about = "Validate and run read-only SQL against per-assignment sample data", long_about = None)]
pub struct Cli {
    /// Configuration file path (defaults are used when it does not exist)
    #[arg(short = 'c', long = "config", default_value = "config.toml")]
    pub config: PathBuf,

    /// Assignment seed file (overrides `[assignments].seed_file`)
    #[arg(long = "assignments")]
    pub assignments: Option<PathBuf>,

    /// Log level (overrides `[logging].level`)
    #[arg(long = "log-level")]
    pub log_level: Option<String>,

    /// Pretty-print JSON output
    #[arg(long = "pretty")]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run a query against an assignment's workspace and print the result
    Query {
        /// Assignment id
        #[arg(short = 'a', long = "assignment")]
        assignment: String,

        /// SQL text
        sql: String,

        /// Print the full report (phase, provisioning, timing) instead of the result
        #[arg(long = "report")]
        report: bool,
    },

    /// Check whether a query would be admitted, without running it
    Validate {
        /// SQL text
        sql: String,
    },

    /// Provision an assignment's workspace ahead of the first query
    Provision {
        /// Assignment id; all assignments when omitted
        assignment: Option<String>,
    },

    /// Drop an assignment's workspace
    DropWorkspace {
        /// Assignment id
        assignment: String,
    },

    /// List materialized workspaces
    Workspaces,

    /// Read commands from stdin, one per line, against a single sandbox
    ///
    /// Lines are SQL for the current assignment, or one of:
    /// `\use <id>`, `\validate <sql>`, `\provision`, `\drop [id]`,
    /// `\workspaces`, `\quit`.
    Shell {
        /// Initial assignment id
        #[arg(short = 'a', long = "assignment")]
        assignment: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query() {
        let cli = Cli::try_parse_from([
            "ciphersql-sandbox",
            "query",
            "-a",
            "65a1",
            "SELECT * FROM customers",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Command::Query {
                assignment: "65a1".to_string(),
                sql: "SELECT * FROM customers".to_string(),
                report: false,
            }
        );
        assert_eq!(cli.config, PathBuf::from("config.toml"));
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "ciphersql-sandbox",
            "--assignments",
            "seed.json",
            "--pretty",
            "drop-workspace",
            "65a1",
        ])
        .unwrap();
        assert_eq!(cli.assignments, Some(PathBuf::from("seed.json")));
        assert!(cli.pretty);
        assert!(matches!(cli.command, Command::DropWorkspace { .. }));
    }

    #[test]
    fn test_query_requires_assignment() {
        assert!(Cli::try_parse_from(["ciphersql-sandbox", "query", "SELECT 1"]).is_err());
    }
}
