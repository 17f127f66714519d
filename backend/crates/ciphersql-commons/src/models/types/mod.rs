//! Column type system: logical (author-facing) types and their engine mapping.

mod arrow_conversion;
mod logical_type;

pub use arrow_conversion::ToArrowType;
pub use logical_type::LogicalType;
