//! Assignment definitions as supplied by the external assignment store.
//!
//! Field names on the wire follow the assignment documents
//! (`sampleTables`, `tableName`, `columnName`, `dataType`).

use crate::models::{AssignmentId, LogicalType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// One seed row: column name → JSON value.
pub type SeedRow = Map<String, JsonValue>;

/// Immutable assignment definition, referenced by identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDefinition {
    #[serde(alias = "_id")]
    pub id: AssignmentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub sample_tables: Vec<SampleTableDefinition>,
}

impl AssignmentDefinition {
    pub fn new(id: impl Into<AssignmentId>, sample_tables: Vec<SampleTableDefinition>) -> Self {
        Self {
            id: id.into(),
            title: None,
            sample_tables,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// A sample table: ordered columns plus ordered seed rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleTableDefinition {
    pub table_name: String,
    pub columns: Vec<ColumnDefinition>,
    #[serde(default)]
    pub rows: Vec<SeedRow>,
}

impl SampleTableDefinition {
    pub fn new(table_name: impl Into<String>, columns: Vec<ColumnDefinition>) -> Self {
        Self {
            table_name: table_name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a seed row given as a JSON object.
    ///
    /// Non-object values are ignored.
    pub fn with_row(mut self, row: JsonValue) -> Self {
        if let JsonValue::Object(map) = row {
            self.rows.push(map);
        }
        self
    }
}

/// A declared column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    pub column_name: String,
    #[serde(alias = "logicalType")]
    pub data_type: LogicalType,
}

impl ColumnDefinition {
    pub fn new(column_name: impl Into<String>, data_type: impl Into<LogicalType>) -> Self {
        Self {
            column_name: column_name.into(),
            data_type: data_type.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_seed_document() {
        let doc = json!({
            "_id": "65a1f3c2e4b0",
            "title": "Find All Customers",
            "sampleTables": [{
                "tableName": "customers",
                "columns": [
                    { "columnName": "id", "dataType": "INTEGER" },
                    { "columnName": "created_at", "dataType": "DATE" }
                ],
                "rows": [ { "id": 1, "created_at": "2024-01-15" } ]
            }]
        });

        let def: AssignmentDefinition = serde_json::from_value(doc).unwrap();
        assert_eq!(def.id.as_str(), "65a1f3c2e4b0");
        assert_eq!(def.title.as_deref(), Some("Find All Customers"));
        assert_eq!(def.sample_tables.len(), 1);

        let table = &def.sample_tables[0];
        assert_eq!(table.table_name, "customers");
        assert_eq!(table.columns[1].data_type, LogicalType::Date);
        assert_eq!(table.rows[0]["id"], json!(1));
    }

    #[test]
    fn test_rows_default_to_empty() {
        let table: SampleTableDefinition = serde_json::from_value(json!({
            "tableName": "empty",
            "columns": [{ "columnName": "x", "dataType": "TEXT" }]
        }))
        .unwrap();
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_builder_ignores_non_object_rows() {
        let table = SampleTableDefinition::new("t", vec![ColumnDefinition::new("a", "TEXT")])
            .with_row(json!({ "a": "x" }))
            .with_row(json!(["not", "a", "row"]));
        assert_eq!(table.rows.len(), 1);
    }
}
