//! Conversions between JSON and Arrow/DataFusion values.
//!
//! - [`json_scalar`]: seed values (JSON) → typed `ScalarValue`s → `RecordBatch`
//! - [`arrow_json_conversion`]: result batches → JSON rows

pub mod arrow_json_conversion;
pub mod json_scalar;

pub use arrow_json_conversion::{record_batch_to_json_rows, scalar_value_to_json};
pub use json_scalar::{json_to_scalar, scalars_to_record_batch};
