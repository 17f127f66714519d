//! Read-only query validation for the CipherSQL sandbox.
//!
//! Learner queries pass through [`QueryValidator::validate`] before any
//! engine interaction. A query is admitted only when it is a single,
//! read-only `SELECT` (optionally introduced by `WITH`).
//!
//! ## Layers
//!
//! 1. Token checks: first keyword, statement terminators, mutating keywords
//!    outside strings and comments
//! 2. AST checks ([`readonly::ReadOnlyGuard`]): exactly one statement whose
//!    root is a query, with no nested statements, `SELECT ... INTO` or
//!    row-locking clauses
//!
//! ```rust
//! use ciphersql_sql::{QueryValidator, Verdict};
//!
//! let validator = QueryValidator::default();
//! assert!(matches!(validator.validate("SELECT 1"), Verdict::Admitted(_)));
//! assert!(matches!(validator.validate("DROP TABLE t"), Verdict::Rejected(_)));
//! ```

pub mod keywords;
pub mod parser;
pub mod readonly;
pub mod validator;

pub use keywords::MutatingKeyword;
pub use validator::{AdmittedQuery, QueryValidator, Rejection, RejectionKind, Verdict};
