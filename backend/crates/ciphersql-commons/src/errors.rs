//! Shared error types for the sandbox crates.

use datafusion::arrow::datatypes::DataType;
use thiserror::Error;

/// Raised when a table or column name cannot be turned into a safe identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("Identifier '{0}' is empty after sanitization")]
    Empty(String),

    #[error("Identifier '{raw}' sanitizes to '{sanitized}', which starts with a digit")]
    LeadingDigit { raw: String, sanitized: String },

    #[error("Identifier '{raw}' exceeds the maximum length of {max} characters")]
    TooLong { raw: String, max: usize },
}

/// Raised when a seed value cannot be bound to a column's engine type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("Cannot convert value {value} to {data_type}")]
    Incompatible { value: String, data_type: DataType },

    #[error("Value {value} is out of range for {data_type}")]
    OutOfRange { value: String, data_type: DataType },

    #[error("Failed to build column array: {0}")]
    ArrayBuild(String),

    #[error("Failed to read result value: {0}")]
    ResultRead(String),
}

impl ConversionError {
    pub(crate) fn incompatible(value: &serde_json::Value, data_type: &DataType) -> Self {
        ConversionError::Incompatible {
            value: value.to_string(),
            data_type: data_type.clone(),
        }
    }
}
