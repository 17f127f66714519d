//! LogicalType - column types as assignment authors write them
//!
//! Assignment documents carry free-form type names (`"INTEGER"`, `"date"`, ...).
//! Recognized names map onto a fixed set of variants; anything else is kept
//! verbatim in `Other` so that a typo in an assignment never blocks it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Author-facing column type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogicalType {
    Integer,
    Text,
    Varchar,
    Real,
    Numeric,
    Date,
    Timestamp,
    Boolean,
    /// Unrecognized type name, stored as written
    Other(String),
}

impl LogicalType {
    /// Get the SQL type name for display
    pub fn sql_name(&self) -> &str {
        match self {
            LogicalType::Integer => "INTEGER",
            LogicalType::Text => "TEXT",
            LogicalType::Varchar => "VARCHAR",
            LogicalType::Real => "REAL",
            LogicalType::Numeric => "NUMERIC",
            LogicalType::Date => "DATE",
            LogicalType::Timestamp => "TIMESTAMP",
            LogicalType::Boolean => "BOOLEAN",
            LogicalType::Other(name) => name.as_str(),
        }
    }

    /// True when the name did not match any known type.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, LogicalType::Other(_))
    }
}

impl FromStr for LogicalType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = match s.trim().to_uppercase().as_str() {
            "INTEGER" | "INT" => LogicalType::Integer,
            "TEXT" => LogicalType::Text,
            "VARCHAR" => LogicalType::Varchar,
            "REAL" => LogicalType::Real,
            "NUMERIC" => LogicalType::Numeric,
            "DATE" => LogicalType::Date,
            "TIMESTAMP" => LogicalType::Timestamp,
            "BOOLEAN" | "BOOL" => LogicalType::Boolean,
            _ => LogicalType::Other(s.to_string()),
        };
        Ok(parsed)
    }
}

impl From<String> for LogicalType {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(t) => t,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for LogicalType {
    fn from(s: &str) -> Self {
        LogicalType::from(s.to_string())
    }
}

impl From<LogicalType> for String {
    fn from(t: LogicalType) -> Self {
        t.sql_name().to_string()
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql_name())
    }
}
