//! Seed value binding: JSON → typed `ScalarValue`.
//!
//! Seed rows never reach the engine as SQL text. Each JSON value is converted
//! to a `ScalarValue` of the column's Arrow type, and the scalars are then
//! assembled column-wise into a `RecordBatch`.
//!
//! Accepted inputs per target type:
//!
//! | Arrow type | Accepts |
//! |---|---|
//! | `Int64` | integral numbers, integral floats, numeric strings |
//! | `Float64` | numbers, numeric strings |
//! | `Utf8` | anything; non-strings are rendered as JSON text |
//! | `Boolean` | bools, `0`/`1`, `true/false/t/f/yes/no` strings |
//! | `Date32` | `YYYY-MM-DD`, or the date part of a timestamp string |
//! | `Timestamp(µs)` | RFC 3339, `YYYY-MM-DD[ T]HH:MM:SS[.f]`, bare dates |
//!
//! JSON `null` becomes a typed NULL for every target type.

use crate::errors::ConversionError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use datafusion::arrow::array::ArrayRef;
use datafusion::arrow::datatypes::{DataType, SchemaRef, TimeUnit};
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::scalar::ScalarValue;
use serde_json::Value as JsonValue;

const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Build a typed NULL for `data_type`.
pub fn typed_null(data_type: &DataType) -> ScalarValue {
    ScalarValue::try_from(data_type).unwrap_or(ScalarValue::Null)
}

/// Convert one JSON seed value to a scalar of `data_type`.
pub fn json_to_scalar(
    value: &JsonValue,
    data_type: &DataType,
) -> Result<ScalarValue, ConversionError> {
    if value.is_null() {
        return Ok(typed_null(data_type));
    }

    match data_type {
        DataType::Int64 => to_i64(value, data_type).map(|v| ScalarValue::Int64(Some(v))),
        DataType::Float64 => to_f64(value, data_type).map(|v| ScalarValue::Float64(Some(v))),
        DataType::Utf8 => Ok(ScalarValue::Utf8(Some(to_text(value)))),
        DataType::Boolean => to_bool(value, data_type).map(|v| ScalarValue::Boolean(Some(v))),
        DataType::Date32 => to_date32(value, data_type).map(|v| ScalarValue::Date32(Some(v))),
        DataType::Timestamp(TimeUnit::Microsecond, tz) => to_timestamp_micros(value, data_type)
            .map(|v| ScalarValue::TimestampMicrosecond(Some(v), tz.clone())),
        other => Err(ConversionError::incompatible(value, other)),
    }
}

/// Assemble row-major scalars into a `RecordBatch` for `schema`.
///
/// Every row must hold exactly one scalar per schema field, already typed.
pub fn scalars_to_record_batch(
    schema: &SchemaRef,
    rows: &[Vec<ScalarValue>],
) -> Result<RecordBatch, ConversionError> {
    if rows.is_empty() {
        return Ok(RecordBatch::new_empty(schema.clone()));
    }

    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());
    for (col_idx, field) in schema.fields().iter().enumerate() {
        let column = rows.iter().map(|row| {
            row.get(col_idx)
                .cloned()
                .unwrap_or_else(|| typed_null(field.data_type()))
        });
        let array = ScalarValue::iter_to_array(column).map_err(|e| {
            ConversionError::ArrayBuild(format!("column '{}': {}", field.name(), e))
        })?;
        arrays.push(array);
    }

    RecordBatch::try_new(schema.clone(), arrays)
        .map_err(|e| ConversionError::ArrayBuild(e.to_string()))
}

fn to_i64(value: &JsonValue, data_type: &DataType) -> Result<i64, ConversionError> {
    match value {
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
                    Ok(f as i64)
                },
                Some(f) if f.fract() == 0.0 => Err(ConversionError::OutOfRange {
                    value: n.to_string(),
                    data_type: data_type.clone(),
                }),
                _ => Err(ConversionError::incompatible(value, data_type)),
            }
        },
        JsonValue::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| ConversionError::incompatible(value, data_type)),
        JsonValue::Bool(b) => Ok(i64::from(*b)),
        _ => Err(ConversionError::incompatible(value, data_type)),
    }
}

fn to_f64(value: &JsonValue, data_type: &DataType) -> Result<f64, ConversionError> {
    match value {
        JsonValue::Number(n) => {
            n.as_f64().ok_or_else(|| ConversionError::incompatible(value, data_type))
        },
        JsonValue::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ConversionError::incompatible(value, data_type)),
        _ => Err(ConversionError::incompatible(value, data_type)),
    }
}

fn to_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn to_bool(value: &JsonValue, data_type: &DataType) -> Result<bool, ConversionError> {
    match value {
        JsonValue::Bool(b) => Ok(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(ConversionError::incompatible(value, data_type)),
        },
        JsonValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "1" => Ok(true),
            "false" | "f" | "no" | "n" | "0" => Ok(false),
            _ => Err(ConversionError::incompatible(value, data_type)),
        },
        _ => Err(ConversionError::incompatible(value, data_type)),
    }
}

fn unix_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    parse_timestamp(raw).map(|ts| ts.date())
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_utc());
    }
    for format in NAIVE_TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn to_date32(value: &JsonValue, data_type: &DataType) -> Result<i32, ConversionError> {
    let JsonValue::String(raw) = value else {
        return Err(ConversionError::incompatible(value, data_type));
    };
    let date = parse_date(raw).ok_or_else(|| ConversionError::incompatible(value, data_type))?;
    let days = date.signed_duration_since(unix_epoch()).num_days();
    i32::try_from(days).map_err(|_| ConversionError::OutOfRange {
        value: raw.clone(),
        data_type: data_type.clone(),
    })
}

fn to_timestamp_micros(value: &JsonValue, data_type: &DataType) -> Result<i64, ConversionError> {
    let JsonValue::String(raw) = value else {
        return Err(ConversionError::incompatible(value, data_type));
    };
    let ts = parse_timestamp(raw).ok_or_else(|| ConversionError::incompatible(value, data_type))?;
    Ok(ts.and_utc().timestamp_micros())
}
