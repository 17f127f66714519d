//! ResultTranslator: engine output → [`QueryResult`].
//!
//! Column types are reported as the Arrow `DataType` display name
//! (`Int64`, `Utf8`, `Date32`, ...). Values are rendered by
//! `ciphersql_commons::conversions`.

use crate::models::{ColumnInfo, QueryResult};
use crate::sql::ExecutionOutput;
use ciphersql_commons::conversions::record_batch_to_json_rows;
use ciphersql_commons::ConversionError;

pub fn translate_output(output: &ExecutionOutput) -> Result<QueryResult, ConversionError> {
    let columns = output
        .schema
        .fields()
        .iter()
        .map(|field| ColumnInfo {
            name: field.name().clone(),
            data_type: field.data_type().to_string(),
        })
        .collect();

    let mut rows = Vec::with_capacity(output.row_count());
    for batch in &output.batches {
        rows.extend(record_batch_to_json_rows(batch)?);
    }

    Ok(QueryResult::Success {
        row_count: rows.len(),
        rows,
        columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use datafusion::arrow::array::{ArrayRef, Date32Array, Int64Array, StringArray};
    use datafusion::arrow::datatypes::{DataType, Field, Schema};
    use datafusion::arrow::record_batch::RecordBatch;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_translate_keeps_column_order_and_types() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, true),
            Field::new("name", DataType::Utf8, true),
            Field::new("joined", DataType::Date32, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![Some(1), None])) as ArrayRef,
                Arc::new(StringArray::from(vec![Some("Ada"), Some("Grace")])) as ArrayRef,
                Arc::new(Date32Array::from(vec![Some(19737), None])) as ArrayRef,
            ],
        )
        .unwrap();

        let result = translate_output(&ExecutionOutput {
            schema,
            batches: vec![batch.clone(), batch],
        })
        .unwrap();

        assert_eq!(result.row_count(), 4);
        let types: Vec<&str> = result.columns().iter().map(|c| c.data_type.as_str()).collect();
        assert_eq!(types, vec!["Int64", "Utf8", "Date32"]);

        let first = &result.rows()[0];
        let keys: Vec<&String> = first.keys().collect();
        assert_eq!(keys, vec!["id", "name", "joined"]);
        assert_eq!(first["joined"], json!("2024-01-15"));
        assert_eq!(result.rows()[1]["id"], json!(null));
    }

    #[test]
    fn test_empty_result_still_reports_columns() {
        let schema = Arc::new(Schema::new(vec![Field::new("n", DataType::Int64, true)]));
        let result = translate_output(&ExecutionOutput {
            schema,
            batches: vec![],
        })
        .unwrap();
        assert_eq!(result.row_count(), 0);
        assert_eq!(result.columns().len(), 1);
    }
}
