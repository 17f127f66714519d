//! CipherSQL sandbox core
//!
//! Materializes assignment sample tables into isolated workspaces and runs
//! validated, read-only learner queries against them on a bounded pool of
//! DataFusion sessions.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use ciphersql_configs::SandboxConfig;
//! use ciphersql_core::assignments::InMemoryAssignmentStore;
//! use ciphersql_core::models::QueryRequest;
//! use ciphersql_core::SqlSandbox;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(InMemoryAssignmentStore::load_from_file("assignments.json")?);
//! let sandbox = SqlSandbox::from_config(&SandboxConfig::default(), store)?;
//!
//! let result = sandbox
//!     .execute_query(&QueryRequest::new("65a1", "SELECT * FROM customers"))
//!     .await;
//! println!("{}", serde_json::to_string(&result)?);
//! # Ok(())
//! # }
//! ```

pub mod assignments;
pub mod catalog;
pub mod error;
pub mod models;
pub mod sandbox;
pub mod sql;
pub mod workspace;

pub use error::{ErrorCode, SandboxError};
pub use sandbox::SqlSandbox;
