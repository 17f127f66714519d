//! Query request and result models
//!
//! Wire shape of a result:
//!
//! ```json
//! { "success": true, "rows": [ { "id": 1 } ], "rowCount": 1,
//!   "columns": [ { "name": "id", "dataType": "Int64" } ] }
//! { "success": false, "error": "...", "code": "UNDEFINED_TABLE" }
//! ```

use crate::error::{ErrorCode, SandboxError};
use ciphersql_commons::conversions::arrow_json_conversion::JsonRow;
use ciphersql_commons::AssignmentId;
use serde::{Deserialize, Serialize};

/// One learner query. Not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub assignment_id: AssignmentId,
    pub raw_query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller_id: Option<String>,
}

impl QueryRequest {
    pub fn new(assignment_id: impl Into<AssignmentId>, raw_query: impl Into<String>) -> Self {
        Self {
            assignment_id: assignment_id.into(),
            raw_query: raw_query.into(),
            caller_id: None,
        }
    }

    pub fn with_caller(mut self, caller_id: impl Into<String>) -> Self {
        self.caller_id = Some(caller_id.into());
        self
    }
}

/// Result column: name plus the engine type identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
}

/// Outcome of one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "QueryResponse")]
pub enum QueryResult {
    Success {
        rows: Vec<JsonRow>,
        row_count: usize,
        columns: Vec<ColumnInfo>,
    },
    Failure {
        message: String,
        code: ErrorCode,
    },
}

impl QueryResult {
    pub fn failure(message: impl Into<String>, code: ErrorCode) -> Self {
        QueryResult::Failure {
            message: message.into(),
            code,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, QueryResult::Success { .. })
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            QueryResult::Success { .. } => None,
            QueryResult::Failure { code, .. } => Some(*code),
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            QueryResult::Success { row_count, .. } => *row_count,
            QueryResult::Failure { .. } => 0,
        }
    }

    pub fn rows(&self) -> &[JsonRow] {
        match self {
            QueryResult::Success { rows, .. } => rows,
            QueryResult::Failure { .. } => &[],
        }
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        match self {
            QueryResult::Success { columns, .. } => columns,
            QueryResult::Failure { .. } => &[],
        }
    }
}

impl From<&SandboxError> for QueryResult {
    fn from(err: &SandboxError) -> Self {
        QueryResult::failure(err.public_message(), err.code())
    }
}

/// Flat serialized form of [`QueryResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<JsonRow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<ColumnInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

impl From<QueryResult> for QueryResponse {
    fn from(result: QueryResult) -> Self {
        match result {
            QueryResult::Success {
                rows,
                row_count,
                columns,
            } => QueryResponse {
                success: true,
                rows: Some(rows),
                row_count: Some(row_count),
                columns: Some(columns),
                error: None,
                code: None,
            },
            QueryResult::Failure { message, code } => QueryResponse {
                success: false,
                rows: None,
                row_count: None,
                columns: None,
                error: Some(message),
                code: Some(code),
            },
        }
    }
}
