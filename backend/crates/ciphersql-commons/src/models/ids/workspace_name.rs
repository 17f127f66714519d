//! Type-safe wrapper for workspace namespace names.

use crate::helpers::naming::derive_workspace_name;
use crate::models::AssignmentId;
use std::fmt;

/// Name of the engine namespace that holds one assignment's sample tables.
///
/// Values are only produced by [`WorkspaceName::derive`], so every instance is
/// a safe identifier made of `[a-z0-9_]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkspaceName(String);

impl WorkspaceName {
    /// Derive the namespace name for an assignment.
    pub fn derive(assignment_id: &AssignmentId) -> Self {
        Self(derive_workspace_name(assignment_id.as_str()))
    }

    /// Returns the namespace name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkspaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for WorkspaceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
