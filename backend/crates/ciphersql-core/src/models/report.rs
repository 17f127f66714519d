//! Per-request report: terminal phase and what provisioning did.

use crate::models::QueryResult;
use serde::Serialize;
use std::fmt;

/// Request state machine.
///
/// `Validating → Provisioning → Executing → {Succeeded, Rejected, Failed}`.
/// `Rejected` is only reachable from `Validating`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryPhase {
    Validating,
    Provisioning,
    Executing,
    Succeeded,
    Rejected,
    Failed,
}

impl QueryPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryPhase::Validating => "validating",
            QueryPhase::Provisioning => "provisioning",
            QueryPhase::Executing => "executing",
            QueryPhase::Succeeded => "succeeded",
            QueryPhase::Rejected => "rejected",
            QueryPhase::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, QueryPhase::Succeeded | QueryPhase::Rejected | QueryPhase::Failed)
    }
}

impl fmt::Display for QueryPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one provisioning pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionReport {
    pub workspace: String,
    pub namespace_created: bool,
    pub tables_created: Vec<String>,
    pub rows_inserted: usize,
    pub rows_skipped: usize,
}

impl ProvisionReport {
    /// True when the workspace already held everything.
    pub fn is_noop(&self) -> bool {
        !self.namespace_created && self.tables_created.is_empty() && self.rows_inserted == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryReport {
    pub result: QueryResult,
    pub phase: QueryPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provision: Option<ProvisionReport>,
    pub took_ms: f64,
}
