//! Type-safe wrapper for assignment identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque assignment identifier as issued by the external assignment store.
///
/// The sandbox never interprets the contents; it only hashes and displays it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentId(String);

impl AssignmentId {
    /// Creates a new AssignmentId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the assignment ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the inner String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AssignmentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AssignmentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for AssignmentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
