//! Shared building blocks for the CipherSQL sandbox.
//!
//! This crate holds everything the other sandbox crates agree on:
//!
//! - **Assignment models**: the immutable definitions learners query against
//!   (`AssignmentDefinition`, `SampleTableDefinition`, `ColumnDefinition`)
//! - **Logical types**: the author-facing column types and their mapping to
//!   Arrow types used by the engine
//! - **Identifiers**: the allow-list sanitizer and the deterministic workspace
//!   name derivation
//! - **Conversions**: JSON seed values → typed scalars, and Arrow result
//!   batches → JSON rows
//!
//! ## Example Usage
//!
//! ```rust
//! use ciphersql_commons::{AssignmentId, WorkspaceName};
//!
//! let name = WorkspaceName::derive(&AssignmentId::new("65a1f3c2e4b0"));
//! assert!(name.as_str().starts_with("ws_"));
//! ```

pub mod conversions;
pub mod errors;
pub mod helpers;
pub mod models;

pub use errors::{ConversionError, IdentifierError};
pub use models::{
    AssignmentDefinition, AssignmentId, ColumnDefinition, LogicalType, SampleTableDefinition,
    SeedRow, ToArrowType, WorkspaceName,
};
