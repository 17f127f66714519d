//! WorkspaceProvisioner: materialize an assignment's sample tables.
//!
//! Provisioning is idempotent and safe under concurrency:
//!
//! 1. **Plan**: sanitize names, check row keys and bind every seed value to
//!    its column type. Nothing is touched if any of this fails.
//! 2. **EnsureNamespace**: create-if-absent through the catalog's atomic
//!    entry; `AlreadyExists` is the only error absorbed.
//! 3. **EnsureTables**: under the workspace's mutex, create missing tables
//!    and insert rows with insert-ignore semantics. The uniqueness key is
//!    the whole typed row.
//!
//! Existing tables are never migrated. When a definition changes after
//! first use, new rows are conformed to the existing table's columns.

use crate::catalog::{SeededTable, Workspace, WorkspaceCatalog, WorkspaceInfo};
use crate::error::{CatalogError, ProvisioningError};
use crate::models::ProvisionReport;
use ciphersql_commons::conversions::json_scalar::typed_null;
use ciphersql_commons::conversions::{json_to_scalar, scalars_to_record_batch};
use ciphersql_commons::helpers::sanitize_identifier;
use ciphersql_commons::{
    AssignmentDefinition, AssignmentId, SampleTableDefinition, ToArrowType, WorkspaceName,
};
use datafusion::arrow::datatypes::{Field, Schema, SchemaRef};
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::scalar::ScalarValue;
use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A sample table ready to be materialized: safe name, engine schema and
/// typed rows in definition order.
#[derive(Debug, Clone)]
pub struct TablePlan {
    pub name: String,
    pub schema: SchemaRef,
    pub rows: Vec<Vec<ScalarValue>>,
}

impl TablePlan {
    /// Validate and bind one sample table definition.
    pub fn from_definition(table: &SampleTableDefinition) -> Result<Self, ProvisioningError> {
        let invalid = |reason: String| ProvisioningError::InvalidDefinition {
            table: table.table_name.clone(),
            reason,
        };

        let name = sanitize_identifier(&table.table_name).map_err(|e| invalid(e.to_string()))?;
        if table.columns.is_empty() {
            return Err(invalid("no columns declared".to_string()));
        }

        let mut fields = Vec::with_capacity(table.columns.len());
        let mut column_names: Vec<String> = Vec::with_capacity(table.columns.len());
        for column in &table.columns {
            let column_name =
                sanitize_identifier(&column.column_name).map_err(|e| invalid(e.to_string()))?;
            if column_names.contains(&column_name) {
                return Err(invalid(format!("duplicate column '{}'", column_name)));
            }
            fields.push(Field::new(&column_name, column.data_type.to_arrow_type(), true));
            column_names.push(column_name);
        }
        let schema: SchemaRef = Arc::new(Schema::new(fields));

        let mut rows = Vec::with_capacity(table.rows.len());
        for (row_idx, row) in table.rows.iter().enumerate() {
            // Row keys may use the declared spelling or the sanitized one
            for key in row.keys() {
                let declared = table.columns.iter().any(|c| &c.column_name == key)
                    || column_names.iter().any(|c| c == key);
                if !declared {
                    return Err(invalid(format!(
                        "row {} has undeclared column '{}'",
                        row_idx, key
                    )));
                }
            }

            let mut values = Vec::with_capacity(table.columns.len());
            for (col_idx, column) in table.columns.iter().enumerate() {
                let field = schema.field(col_idx);
                let raw = row
                    .get(&column.column_name)
                    .or_else(|| row.get(field.name()))
                    .unwrap_or(&JsonValue::Null);
                let value = json_to_scalar(raw, field.data_type()).map_err(|source| {
                    ProvisioningError::InvalidSeedValue {
                        table: name.clone(),
                        column: field.name().clone(),
                        row: row_idx,
                        source,
                    }
                })?;
                values.push(value);
            }
            rows.push(values);
        }

        Ok(Self { name, schema, rows })
    }
}

/// Validate and bind every table of an assignment.
pub fn plan_tables(assignment: &AssignmentDefinition) -> Result<Vec<TablePlan>, ProvisioningError> {
    let mut seen = HashSet::new();
    let mut plans = Vec::with_capacity(assignment.sample_tables.len());
    for table in &assignment.sample_tables {
        let plan = TablePlan::from_definition(table)?;
        if !seen.insert(plan.name.clone()) {
            return Err(ProvisioningError::InvalidDefinition {
                table: table.table_name.clone(),
                reason: format!("duplicate table '{}'", plan.name),
            });
        }
        plans.push(plan);
    }
    Ok(plans)
}

/// Computed but not yet applied changes for one table.
struct PendingTable {
    name: String,
    schema: SchemaRef,
    created: bool,
    new_batch: Option<RecordBatch>,
    new_keys: Vec<Vec<ScalarValue>>,
    skipped: usize,
}

#[derive(Debug, Clone)]
pub struct WorkspaceProvisioner {
    catalog: Arc<WorkspaceCatalog>,
}

impl WorkspaceProvisioner {
    pub fn new(catalog: Arc<WorkspaceCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<WorkspaceCatalog> {
        &self.catalog
    }

    /// EnsureNamespace then EnsureTables for `assignment`.
    pub async fn provision(
        &self,
        assignment: &AssignmentDefinition,
    ) -> Result<(Arc<Workspace>, ProvisionReport), ProvisioningError> {
        let plans = plan_tables(assignment)?;
        let (workspace, namespace_created) = self.ensure_namespace(&assignment.id)?;

        let mut report = self.ensure_tables(&workspace, &plans).await?;
        report.namespace_created = namespace_created;

        if report.is_noop() {
            log::debug!("✅ Workspace {} already provisioned", workspace.name());
        } else {
            log::info!(
                "✅ Provisioned workspace {} for assignment {}: tables_created={:?} rows_inserted={} rows_skipped={}",
                workspace.name(),
                assignment.id,
                report.tables_created,
                report.rows_inserted,
                report.rows_skipped
            );
        }

        Ok((workspace, report))
    }

    /// Create the namespace if absent. Returns the workspace and whether this
    /// call created it.
    pub fn ensure_namespace(
        &self,
        assignment_id: &AssignmentId,
    ) -> Result<(Arc<Workspace>, bool), ProvisioningError> {
        match self.catalog.create_workspace(assignment_id) {
            Ok(workspace) => Ok((workspace, true)),
            Err(e) if e.is_already_exists() => {
                let name = WorkspaceName::derive(assignment_id);
                // Dropped by an admin between the two calls
                let workspace = self
                    .catalog
                    .workspace(&name)
                    .ok_or_else(|| CatalogError::NotFound(name.to_string()))?;
                Ok((workspace, false))
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Create missing tables and insert-ignore rows.
    ///
    /// All batches are built before anything is registered, so a failure
    /// leaves the workspace as it was.
    pub async fn ensure_tables(
        &self,
        workspace: &Workspace,
        plans: &[TablePlan],
    ) -> Result<ProvisionReport, ProvisioningError> {
        let mut tables = workspace.lock_tables().await;

        let mut pending = Vec::with_capacity(plans.len());
        for plan in plans {
            pending.push(self.prepare_table(workspace, &tables, plan)?);
        }

        let mut report = ProvisionReport {
            workspace: workspace.name().to_string(),
            ..Default::default()
        };

        for table in pending {
            report.rows_skipped += table.skipped;
            if !table.created && table.new_batch.is_none() {
                continue;
            }

            let mut next = tables
                .get(&table.name)
                .cloned()
                .unwrap_or_else(|| SeededTable::new(table.schema.clone()));
            if let Some(batch) = table.new_batch {
                report.rows_inserted += batch.num_rows();
                next.batches.push(batch);
            }
            next.seen.extend(table.new_keys);

            workspace
                .install_table(&table.name, next.schema.clone(), next.batches.clone())
                .map_err(|e| ProvisioningError::Load {
                    table: table.name.clone(),
                    reason: e.to_string(),
                })?;
            if table.created {
                report.tables_created.push(table.name.clone());
            }
            tables.insert(table.name, next);
        }

        Ok(report)
    }

    fn prepare_table(
        &self,
        workspace: &Workspace,
        tables: &HashMap<String, SeededTable>,
        plan: &TablePlan,
    ) -> Result<PendingTable, ProvisioningError> {
        let existing = tables.get(&plan.name);

        if existing.is_none() && workspace.has_table(&plan.name) {
            log::warn!(
                "⚠️  Table {}.{} is not managed by the provisioner; leaving it alone",
                workspace.name(),
                plan.name
            );
            return Ok(PendingTable {
                name: plan.name.clone(),
                schema: plan.schema.clone(),
                created: false,
                new_batch: None,
                new_keys: Vec::new(),
                skipped: plan.rows.len(),
            });
        }

        let schema = existing
            .map(|t| t.schema.clone())
            .unwrap_or_else(|| plan.schema.clone());
        let empty = HashSet::new();
        let seen = existing.map(|t| &t.seen).unwrap_or(&empty);

        let mut new_keys: Vec<Vec<ScalarValue>> = Vec::new();
        let mut fresh: HashSet<Vec<ScalarValue>> = HashSet::new();
        let mut skipped = 0;
        for row in &plan.rows {
            let row = if schema == plan.schema {
                row.clone()
            } else {
                conform_row(row, &plan.schema, &schema).map_err(|reason| {
                    ProvisioningError::Load {
                        table: plan.name.clone(),
                        reason,
                    }
                })?
            };
            if seen.contains(&row) || !fresh.insert(row.clone()) {
                skipped += 1;
                continue;
            }
            new_keys.push(row);
        }

        let new_batch = if new_keys.is_empty() {
            None
        } else {
            let batch = scalars_to_record_batch(&schema, &new_keys).map_err(|e| {
                ProvisioningError::Load {
                    table: plan.name.clone(),
                    reason: e.to_string(),
                }
            })?;
            Some(batch)
        };

        Ok(PendingTable {
            name: plan.name.clone(),
            schema,
            created: existing.is_none(),
            new_batch,
            new_keys,
            skipped,
        })
    }

    /// Admin cleanup. Returns false if there was nothing to drop.
    pub fn drop_workspace(&self, assignment_id: &AssignmentId) -> bool {
        let name = WorkspaceName::derive(assignment_id);
        match self.catalog.drop_workspace(&name) {
            Some(_) => {
                log::info!("🗑️  Dropped workspace {} (assignment {})", name, assignment_id);
                true
            },
            None => false,
        }
    }

    pub fn list_workspaces(&self) -> Vec<WorkspaceInfo> {
        self.catalog.list_workspaces()
    }
}

/// Project a row typed for `from` onto the columns of `to`, by name.
fn conform_row(
    row: &[ScalarValue],
    from: &SchemaRef,
    to: &SchemaRef,
) -> Result<Vec<ScalarValue>, String> {
    to.fields()
        .iter()
        .map(|field| match from.index_of(field.name()) {
            Ok(idx) => row[idx]
                .cast_to(field.data_type())
                .map_err(|e| format!("column '{}': {}", field.name(), e)),
            Err(_) => Ok(typed_null(field.data_type())),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ciphersql_commons::ColumnDefinition;
    use serde_json::json;

    fn customers() -> SampleTableDefinition {
        SampleTableDefinition::new(
            "customers",
            vec![
                ColumnDefinition::new("id", "INTEGER"),
                ColumnDefinition::new("name", "TEXT"),
            ],
        )
        .with_row(json!({ "id": 1, "name": "Ada" }))
        .with_row(json!({ "id": 2, "name": "Grace" }))
    }

    #[test]
    fn test_plan_binds_rows() {
        let plan = TablePlan::from_definition(&customers()).unwrap();
        assert_eq!(plan.name, "customers");
        assert_eq!(plan.rows.len(), 2);
        assert_eq!(plan.rows[0][0], ScalarValue::Int64(Some(1)));
    }

    #[test]
    fn test_plan_rejects_undeclared_row_key() {
        let table = customers().with_row(json!({ "id": 3, "email": "x@example.com" }));
        let err = TablePlan::from_definition(&table).unwrap_err();
        assert!(err.to_string().contains("undeclared column 'email'"), "{}", err);
    }

    #[test]
    fn test_plan_rejects_duplicate_sanitized_columns() {
        let table = SampleTableDefinition::new(
            "t",
            vec![
                ColumnDefinition::new("first-name", "TEXT"),
                ColumnDefinition::new("firstname", "TEXT"),
            ],
        );
        assert!(matches!(
            TablePlan::from_definition(&table),
            Err(ProvisioningError::InvalidDefinition { .. })
        ));
    }

    #[test]
    fn test_plan_rejects_bad_value() {
        let table = customers().with_row(json!({ "id": "three", "name": "x" }));
        assert!(matches!(
            TablePlan::from_definition(&table),
            Err(ProvisioningError::InvalidSeedValue { row: 2, .. })
        ));
    }

    #[test]
    fn test_plan_rejects_duplicate_tables() {
        let assignment = AssignmentDefinition::new("a1", vec![customers(), customers()]);
        assert!(plan_tables(&assignment).is_err());
    }

    #[test]
    fn test_conform_row_fills_missing_columns() {
        let from: SchemaRef = Arc::new(Schema::new(vec![Field::new(
            "id",
            datafusion::arrow::datatypes::DataType::Int64,
            true,
        )]));
        let to: SchemaRef = Arc::new(Schema::new(vec![
            Field::new("id", datafusion::arrow::datatypes::DataType::Utf8, true),
            Field::new("name", datafusion::arrow::datatypes::DataType::Utf8, true),
        ]));

        let row = conform_row(&[ScalarValue::Int64(Some(7))], &from, &to).unwrap();
        assert_eq!(row[0], ScalarValue::Utf8(Some("7".to_string())));
        assert_eq!(row[1], ScalarValue::Utf8(None));
    }

    #[tokio::test]
    async fn test_provision_is_idempotent() {
        let provisioner = WorkspaceProvisioner::new(Arc::new(WorkspaceCatalog::new()));
        let assignment = AssignmentDefinition::new("a1", vec![customers()]);

        let (_, first) = provisioner.provision(&assignment).await.unwrap();
        assert!(first.namespace_created);
        assert_eq!(first.tables_created, vec!["customers".to_string()]);
        assert_eq!(first.rows_inserted, 2);

        let (workspace, second) = provisioner.provision(&assignment).await.unwrap();
        assert!(second.is_noop());
        assert_eq!(second.rows_skipped, 2);

        let tables = workspace.lock_tables().await;
        assert_eq!(tables["customers"].row_count(), 2);
    }

    #[tokio::test]
    async fn test_invalid_definition_creates_nothing() {
        let provisioner = WorkspaceProvisioner::new(Arc::new(WorkspaceCatalog::new()));
        let bad = SampleTableDefinition::new("9lives", vec![ColumnDefinition::new("x", "TEXT")]);
        let assignment = AssignmentDefinition::new("a1", vec![bad]);

        assert!(provisioner.provision(&assignment).await.is_err());
        assert!(provisioner.list_workspaces().is_empty());
    }
}
