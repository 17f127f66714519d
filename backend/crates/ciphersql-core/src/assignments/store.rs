//! AssignmentStore: where assignment definitions come from.
//!
//! The sandbox only reads definitions. The bundled
//! [`InMemoryAssignmentStore`] can be filled programmatically or from a JSON
//! file holding an array of assignment documents:
//!
//! ```json
//! [ { "_id": "65a1", "title": "...", "sampleTables": [ ... ] } ]
//! ```

use crate::error::StoreError;
use async_trait::async_trait;
use ciphersql_commons::{AssignmentDefinition, AssignmentId};
use dashmap::DashMap;
use std::path::Path;

#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Look up one assignment. `Ok(None)` when it does not exist.
    async fn get_by_id(&self, id: &AssignmentId)
        -> Result<Option<AssignmentDefinition>, StoreError>;
}

#[derive(Debug, Default)]
pub struct InMemoryAssignmentStore {
    assignments: DashMap<AssignmentId, AssignmentDefinition>,
}

impl InMemoryAssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_definitions(definitions: impl IntoIterator<Item = AssignmentDefinition>) -> Self {
        let store = Self::new();
        for definition in definitions {
            store.insert(definition);
        }
        store
    }

    /// Parse a JSON array of assignment documents.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let definitions: Vec<AssignmentDefinition> = serde_json::from_str(json)?;
        Ok(Self::from_definitions(definitions))
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let store = Self::from_json(&json)?;
        log::info!("📖 Loaded {} assignments from {}", store.len(), path.display());
        Ok(store)
    }

    /// Insert or replace a definition. Returns the previous one.
    pub fn insert(&self, definition: AssignmentDefinition) -> Option<AssignmentDefinition> {
        self.assignments.insert(definition.id.clone(), definition)
    }

    pub fn remove(&self, id: &AssignmentId) -> Option<AssignmentDefinition> {
        self.assignments.remove(id).map(|(_, definition)| definition)
    }

    /// All known assignment ids, sorted.
    pub fn ids(&self) -> Vec<AssignmentId> {
        let mut ids: Vec<AssignmentId> =
            self.assignments.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

#[async_trait]
impl AssignmentStore for InMemoryAssignmentStore {
    async fn get_by_id(
        &self,
        id: &AssignmentId,
    ) -> Result<Option<AssignmentDefinition>, StoreError> {
        Ok(self.assignments.get(id).map(|entry| entry.value().clone()))
    }
}
