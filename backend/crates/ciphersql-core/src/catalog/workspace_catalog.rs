//! WorkspaceCatalog: one in-memory schema per assignment.
//!
//! Workspaces are keyed by [`WorkspaceName`]. Creation goes through the
//! `DashMap` entry API, so two concurrent first requests for the same
//! assignment see exactly one `Ok` and one [`CatalogError::AlreadyExists`].
//!
//! Tables are registered with the engine through `SchemaProvider`, never
//! through DDL text. Each table's typed rows live next to it in
//! [`SeededTable`] so that re-seeding can skip rows already present.

use crate::error::CatalogError;
use ciphersql_commons::conversions::scalars_to_record_batch;
use ciphersql_commons::helpers::sanitize_identifier;
use ciphersql_commons::{AssignmentId, WorkspaceName};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use datafusion::arrow::datatypes::SchemaRef;
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::catalog::{MemorySchemaProvider, SchemaProvider, TableProvider};
use datafusion::datasource::MemTable;
use datafusion::scalar::ScalarValue;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// A materialized sample table and the typed rows it already holds.
#[derive(Debug, Clone)]
pub struct SeededTable {
    pub schema: SchemaRef,
    pub batches: Vec<RecordBatch>,
    pub seen: HashSet<Vec<ScalarValue>>,
}

impl SeededTable {
    pub fn new(schema: SchemaRef) -> Self {
        Self {
            schema,
            batches: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.batches.iter().map(|b| b.num_rows()).sum()
    }
}

/// One assignment's namespace.
#[derive(Debug)]
pub struct Workspace {
    name: WorkspaceName,
    assignment_id: AssignmentId,
    schema: Arc<MemorySchemaProvider>,
    tables: Mutex<HashMap<String, SeededTable>>,
}

impl Workspace {
    fn new(name: WorkspaceName, assignment_id: AssignmentId) -> Self {
        Self {
            name,
            assignment_id,
            schema: Arc::new(MemorySchemaProvider::new()),
            tables: Mutex::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &WorkspaceName {
        &self.name
    }

    pub fn assignment_id(&self) -> &AssignmentId {
        &self.assignment_id
    }

    /// Engine schema holding this workspace's tables.
    pub fn schema(&self) -> Arc<dyn SchemaProvider> {
        self.schema.clone()
    }

    /// Table names currently registered with the engine, sorted.
    pub fn table_names(&self) -> Vec<String> {
        let mut names = self.schema.table_names();
        names.sort();
        names
    }

    pub fn has_table(&self, table_name: &str) -> bool {
        self.schema.table_exist(table_name)
    }

    /// Lock the seeded-table state. Held for the whole of one seeding pass.
    pub async fn lock_tables(&self) -> MutexGuard<'_, HashMap<String, SeededTable>> {
        self.tables.lock().await
    }

    /// Register (or replace) `table_name` with the given batches.
    pub fn install_table(
        &self,
        table_name: &str,
        schema: SchemaRef,
        batches: Vec<RecordBatch>,
    ) -> Result<(), CatalogError> {
        let batches = if batches.is_empty() {
            vec![RecordBatch::new_empty(schema.clone())]
        } else {
            batches
        };
        let table = MemTable::try_new(schema, vec![batches])
            .map_err(|e| CatalogError::Engine(e.to_string()))?;

        if self.schema.table_exist(table_name) {
            self.schema
                .deregister_table(table_name)
                .map_err(|e| CatalogError::Engine(e.to_string()))?;
        }
        self.schema
            .register_table(table_name.to_string(), Arc::new(table))
            .map_err(|e| CatalogError::Engine(e.to_string()))?;
        Ok(())
    }
}

/// Summary of a materialized workspace, for admin listings.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceInfo {
    pub name: String,
    pub assignment_id: String,
    pub tables: Vec<String>,
}

#[derive(Debug)]
pub struct WorkspaceCatalog {
    workspaces: DashMap<WorkspaceName, Arc<Workspace>>,
    public: Arc<MemorySchemaProvider>,
}

impl Default for WorkspaceCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkspaceCatalog {
    pub fn new() -> Self {
        Self {
            workspaces: DashMap::new(),
            public: Arc::new(MemorySchemaProvider::new()),
        }
    }

    /// Create the workspace for `assignment_id`.
    ///
    /// Fails with [`CatalogError::AlreadyExists`] if it is already there.
    pub fn create_workspace(
        &self,
        assignment_id: &AssignmentId,
    ) -> Result<Arc<Workspace>, CatalogError> {
        let name = WorkspaceName::derive(assignment_id);
        match self.workspaces.entry(name.clone()) {
            Entry::Occupied(_) => Err(CatalogError::AlreadyExists(name.to_string())),
            Entry::Vacant(vacant) => {
                let workspace = Arc::new(Workspace::new(name, assignment_id.clone()));
                vacant.insert(workspace.clone());
                log::debug!("📁 Created workspace {}", workspace.name());
                Ok(workspace)
            },
        }
    }

    pub fn workspace(&self, name: &WorkspaceName) -> Option<Arc<Workspace>> {
        self.workspaces.get(name).map(|entry| entry.value().clone())
    }

    pub fn workspace_for(&self, assignment_id: &AssignmentId) -> Option<Arc<Workspace>> {
        self.workspace(&WorkspaceName::derive(assignment_id))
    }

    pub fn contains(&self, name: &WorkspaceName) -> bool {
        self.workspaces.contains_key(name)
    }

    /// Remove a workspace. Sessions already bound to it keep their handle
    /// until they are released.
    pub fn drop_workspace(&self, name: &WorkspaceName) -> Option<Arc<Workspace>> {
        self.workspaces.remove(name).map(|(_, workspace)| workspace)
    }

    /// All workspaces, sorted by name.
    pub fn list_workspaces(&self) -> Vec<WorkspaceInfo> {
        let mut infos: Vec<WorkspaceInfo> = self
            .workspaces
            .iter()
            .map(|entry| {
                let workspace = entry.value();
                WorkspaceInfo {
                    name: workspace.name().to_string(),
                    assignment_id: workspace.assignment_id().to_string(),
                    tables: workspace.table_names(),
                }
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    pub fn len(&self) -> usize {
        self.workspaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workspaces.is_empty()
    }

    /// The shared `public` schema.
    pub fn public_schema(&self) -> Arc<dyn SchemaProvider> {
        self.public.clone()
    }

    /// Expose `table` to every session as `public.<name>`.
    pub fn register_shared_table(
        &self,
        name: &str,
        table: Arc<dyn TableProvider>,
    ) -> Result<(), CatalogError> {
        let name = sanitize_identifier(name)?;
        if self.public.table_exist(&name) {
            return Err(CatalogError::AlreadyExists(format!("public.{}", name)));
        }
        self.public
            .register_table(name.clone(), table)
            .map_err(|e| CatalogError::Engine(e.to_string()))?;
        log::info!("📚 Registered shared table public.{}", name);
        Ok(())
    }

    /// Convenience wrapper: build a `MemTable` from typed rows and share it.
    pub fn register_shared_rows(
        &self,
        name: &str,
        schema: SchemaRef,
        rows: &[Vec<ScalarValue>],
    ) -> Result<(), CatalogError> {
        let batch = scalars_to_record_batch(&schema, rows)
            .map_err(|e| CatalogError::Engine(e.to_string()))?;
        let table = MemTable::try_new(schema, vec![vec![batch]])
            .map_err(|e| CatalogError::Engine(e.to_string()))?;
        self.register_shared_table(name, Arc::new(table))
    }
}
