//! Arrow type conversion for LogicalType
//!
//! This is the sandbox's type mapper: every logical column type resolves to
//! exactly one Arrow `DataType`. The mapping never fails; unrecognized types
//! fall back to UTF-8 text, the most permissive column type.

use super::LogicalType;
use datafusion::arrow::datatypes::{DataType as ArrowDataType, TimeUnit};

/// Trait for converting to Arrow DataType
pub trait ToArrowType {
    /// Convert to Arrow DataType
    fn to_arrow_type(&self) -> ArrowDataType;
}

impl ToArrowType for LogicalType {
    fn to_arrow_type(&self) -> ArrowDataType {
        match self {
            LogicalType::Integer => ArrowDataType::Int64,
            LogicalType::Text | LogicalType::Varchar => ArrowDataType::Utf8,
            // Float64 keeps seeded decimals like 19.99 printable as written
            LogicalType::Real | LogicalType::Numeric => ArrowDataType::Float64,
            LogicalType::Date => ArrowDataType::Date32,
            LogicalType::Timestamp => ArrowDataType::Timestamp(TimeUnit::Microsecond, None),
            LogicalType::Boolean => ArrowDataType::Boolean,
            LogicalType::Other(_) => ArrowDataType::Utf8,
        }
    }
}
