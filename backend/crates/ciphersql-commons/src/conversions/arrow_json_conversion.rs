//! Arrow → JSON conversion for query results
//!
//! All cell conversions flow through [`scalar_value_to_json`]:
//! ```text
//! RecordBatch ─► ScalarValue::try_from_array ─► scalar_value_to_json ─► JSON row
//! ```
//!
//! # Serialization Format
//!
//! - Integers and finite floats as JSON numbers
//! - Non-finite floats (`NaN`, `inf`) as strings
//! - Decimals as strings with their exact scale (`"200.75"`)
//! - `Date32`/`Date64` as `"YYYY-MM-DD"`
//! - Timestamps as ISO-8601 (`"2024-01-15T10:30:00"`, fractional seconds only
//!   when non-zero); zoned timestamps as RFC 3339
//! - Anything else as the engine's display string
//!
//! Conversion of a single value never fails; the fallback is text.

use crate::errors::ConversionError;
use chrono::{DateTime, NaiveDate, SecondsFormat};
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::scalar::ScalarValue;
use serde_json::{Map, Number, Value as JsonValue};

/// One result row, keys in column order.
pub type JsonRow = Map<String, JsonValue>;

const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Convert a single scalar to its JSON rendering.
pub fn scalar_value_to_json(value: &ScalarValue) -> JsonValue {
    if value.is_null() {
        return JsonValue::Null;
    }

    match value {
        ScalarValue::Boolean(Some(b)) => JsonValue::Bool(*b),
        ScalarValue::Int8(Some(i)) => JsonValue::Number((*i).into()),
        ScalarValue::Int16(Some(i)) => JsonValue::Number((*i).into()),
        ScalarValue::Int32(Some(i)) => JsonValue::Number((*i).into()),
        ScalarValue::Int64(Some(i)) => JsonValue::Number((*i).into()),
        ScalarValue::UInt8(Some(i)) => JsonValue::Number((*i).into()),
        ScalarValue::UInt16(Some(i)) => JsonValue::Number((*i).into()),
        ScalarValue::UInt32(Some(i)) => JsonValue::Number((*i).into()),
        ScalarValue::UInt64(Some(i)) => JsonValue::Number((*i).into()),
        ScalarValue::Float32(Some(f)) => float_to_json(f64::from(*f)),
        ScalarValue::Float64(Some(f)) => float_to_json(*f),
        ScalarValue::Utf8(Some(s))
        | ScalarValue::LargeUtf8(Some(s))
        | ScalarValue::Utf8View(Some(s)) => JsonValue::String(s.clone()),
        ScalarValue::Date32(Some(days)) => date_to_json(*days),
        ScalarValue::Date64(Some(ms)) => {
            let days = ms.div_euclid(86_400_000);
            i32::try_from(days)
                .map(date_to_json)
                .unwrap_or_else(|_| JsonValue::String(value.to_string()))
        },
        ScalarValue::TimestampSecond(Some(v), tz) => {
            timestamp_to_json(DateTime::from_timestamp(*v, 0), tz.is_some(), value)
        },
        ScalarValue::TimestampMillisecond(Some(v), tz) => {
            timestamp_to_json(DateTime::from_timestamp_millis(*v), tz.is_some(), value)
        },
        ScalarValue::TimestampMicrosecond(Some(v), tz) => {
            timestamp_to_json(DateTime::from_timestamp_micros(*v), tz.is_some(), value)
        },
        ScalarValue::TimestampNanosecond(Some(v), tz) => {
            let ts = DateTime::from_timestamp(v.div_euclid(1_000_000_000), v.rem_euclid(1_000_000_000) as u32);
            timestamp_to_json(ts, tz.is_some(), value)
        },
        ScalarValue::Decimal128(Some(v), _precision, scale) => {
            // 20075 with scale=2 -> "200.75"
            if *scale <= 0 {
                return JsonValue::String(value.to_string());
            }
            let divisor = 10i128.pow(*scale as u32);
            let integer_part = v / divisor;
            let fractional_part = (v % divisor).abs();
            let sign = if *v < 0 && integer_part == 0 { "-" } else { "" };
            JsonValue::String(format!(
                "{}{}.{:0>width$}",
                sign,
                integer_part,
                fractional_part,
                width = *scale as usize
            ))
        },
        other => JsonValue::String(other.to_string()),
    }
}

fn float_to_json(f: f64) -> JsonValue {
    Number::from_f64(f)
        .map(JsonValue::Number)
        .unwrap_or_else(|| JsonValue::String(f.to_string()))
}

fn date_to_json(days: i32) -> JsonValue {
    match days
        .checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
    {
        Some(date) => JsonValue::String(date.format("%Y-%m-%d").to_string()),
        None => JsonValue::String(days.to_string()),
    }
}

fn timestamp_to_json(
    ts: Option<DateTime<chrono::Utc>>,
    zoned: bool,
    original: &ScalarValue,
) -> JsonValue {
    match ts {
        Some(ts) if zoned => JsonValue::String(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        Some(ts) => JsonValue::String(ts.naive_utc().format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
        None => JsonValue::String(original.to_string()),
    }
}

/// Convert a RecordBatch to JSON rows, keeping column order.
///
/// Columns with the same output name collapse into one key (last one wins).
pub fn record_batch_to_json_rows(batch: &RecordBatch) -> Result<Vec<JsonRow>, ConversionError> {
    let schema = batch.schema();
    let num_rows = batch.num_rows();

    let mut rows = Vec::with_capacity(num_rows);
    for row_idx in 0..num_rows {
        let mut json_row = Map::with_capacity(batch.num_columns());

        for (col_idx, field) in schema.fields().iter().enumerate() {
            let scalar = ScalarValue::try_from_array(batch.column(col_idx).as_ref(), row_idx)
                .map_err(|e| ConversionError::ResultRead(format!("{}: {}", field.name(), e)))?;
            json_row.insert(field.name().clone(), scalar_value_to_json(&scalar));
        }

        rows.push(json_row);
    }

    Ok(rows)
}
