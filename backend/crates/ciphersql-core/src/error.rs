// Error types module
use ciphersql_commons::{AssignmentId, ConversionError, IdentifierError};
use ciphersql_sql::{Rejection, RejectionKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Stable, caller-facing error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation
    EmptyQuery,
    QueryTooLong,
    SyntaxError,
    OnlySelectAllowed,
    MultipleStatements,
    ProhibitedOperation,
    // Lookup / provisioning
    AssignmentNotFound,
    ProvisioningFailed,
    // Execution
    UndefinedTable,
    UndefinedColumn,
    AmbiguousColumn,
    UndefinedFunction,
    TypeMismatch,
    DivisionByZero,
    FeatureNotSupported,
    ReadOnlyViolation,
    ResourcesExhausted,
    StatementTimeout,
    ExecutionFailed,
    // Internal
    PoolExhausted,
    InternalError,
}

impl ErrorCode {
    /// Get the string representation of the error code
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::EmptyQuery => "EMPTY_QUERY",
            ErrorCode::QueryTooLong => "QUERY_TOO_LONG",
            ErrorCode::SyntaxError => "SYNTAX_ERROR",
            ErrorCode::OnlySelectAllowed => "ONLY_SELECT_ALLOWED",
            ErrorCode::MultipleStatements => "MULTIPLE_STATEMENTS",
            ErrorCode::ProhibitedOperation => "PROHIBITED_OPERATION",
            ErrorCode::AssignmentNotFound => "ASSIGNMENT_NOT_FOUND",
            ErrorCode::ProvisioningFailed => "PROVISIONING_FAILED",
            ErrorCode::UndefinedTable => "UNDEFINED_TABLE",
            ErrorCode::UndefinedColumn => "UNDEFINED_COLUMN",
            ErrorCode::AmbiguousColumn => "AMBIGUOUS_COLUMN",
            ErrorCode::UndefinedFunction => "UNDEFINED_FUNCTION",
            ErrorCode::TypeMismatch => "TYPE_MISMATCH",
            ErrorCode::DivisionByZero => "DIVISION_BY_ZERO",
            ErrorCode::FeatureNotSupported => "FEATURE_NOT_SUPPORTED",
            ErrorCode::ReadOnlyViolation => "READ_ONLY_VIOLATION",
            ErrorCode::ResourcesExhausted => "RESOURCES_EXHAUSTED",
            ErrorCode::StatementTimeout => "STATEMENT_TIMEOUT",
            ErrorCode::ExecutionFailed => "EXECUTION_FAILED",
            ErrorCode::PoolExhausted => "POOL_EXHAUSTED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<RejectionKind> for ErrorCode {
    fn from(kind: RejectionKind) -> Self {
        match kind {
            RejectionKind::Empty => ErrorCode::EmptyQuery,
            RejectionKind::TooLong => ErrorCode::QueryTooLong,
            RejectionKind::Syntax => ErrorCode::SyntaxError,
            RejectionKind::NotSelect => ErrorCode::OnlySelectAllowed,
            RejectionKind::MultipleStatements => ErrorCode::MultipleStatements,
            RejectionKind::ProhibitedOperation => ErrorCode::ProhibitedOperation,
        }
    }
}

/// Catalog-level failures. `AlreadyExists` is the only kind callers absorb.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("'{0}' already exists")]
    AlreadyExists(String),

    #[error("'{0}' not found")]
    NotFound(String),

    #[error(transparent)]
    InvalidIdentifier(#[from] IdentifierError),

    #[error("Engine catalog error: {0}")]
    Engine(String),
}

impl CatalogError {
    pub fn is_already_exists(&self) -> bool {
        matches!(self, CatalogError::AlreadyExists(_))
    }
}

/// Failure while materializing an assignment's workspace.
#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("Invalid sample table '{table}': {reason}")]
    InvalidDefinition { table: String, reason: String },

    #[error("Invalid seed value in '{table}'.{column} (row {row}): {source}")]
    InvalidSeedValue {
        table: String,
        column: String,
        row: usize,
        #[source]
        source: ConversionError,
    },

    #[error("Failed to load rows into '{table}': {reason}")]
    Load { table: String, reason: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// A failed statement: stable code plus the scrubbed engine message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ExecutionError {
    pub code: ErrorCode,
    pub message: String,
}

impl ExecutionError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Session pool failures.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("No sandbox session became available within {0:?}")]
    Exhausted(Duration),

    #[error("Session pool is closed")]
    Closed,
}

/// Assignment store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read assignments from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse assignments: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Assignment store unavailable: {0}")]
    Unavailable(String),
}

/// Main error type for the sandbox
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error(transparent)]
    Validation(#[from] Rejection),

    #[error("Assignment not found: {0}")]
    AssignmentNotFound(AssignmentId),

    #[error("Provisioning failed: {0}")]
    Provisioning(#[from] ProvisioningError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Internal(String),
}

impl SandboxError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SandboxError::Validation(rejection) => rejection.kind.into(),
            SandboxError::AssignmentNotFound(_) => ErrorCode::AssignmentNotFound,
            SandboxError::Provisioning(_) => ErrorCode::ProvisioningFailed,
            SandboxError::Execution(e) => e.code,
            SandboxError::Pool(PoolError::Exhausted(_)) => ErrorCode::PoolExhausted,
            SandboxError::Pool(PoolError::Closed)
            | SandboxError::Store(_)
            | SandboxError::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Message safe to show to the learner.
    ///
    /// Provisioning and internal failures never expose engine details.
    pub fn public_message(&self) -> String {
        match self {
            SandboxError::Validation(rejection) => rejection.message.clone(),
            SandboxError::AssignmentNotFound(_) => "Assignment not found".to_string(),
            SandboxError::Provisioning(_) => {
                "Failed to prepare the assignment dataset. Please try again later.".to_string()
            },
            SandboxError::Execution(e) => e.message.clone(),
            SandboxError::Pool(PoolError::Exhausted(_)) => {
                "The sandbox is busy right now. Please try again in a moment.".to_string()
            },
            SandboxError::Pool(PoolError::Closed)
            | SandboxError::Store(_)
            | SandboxError::Internal(_) => "Internal server error".to_string(),
        }
    }
}
