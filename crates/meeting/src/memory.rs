//! In-memory document store.
//!
//! Evaluates queries with [`Query::matches`]. Suitable for tests, the CLI, and
//! single-process deployments that do not need durability.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::store::{Document, DocumentId, DocumentStore, Query, StoreError, StoredDocument};

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<BTreeMap<String, Vec<StoredDocument>>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every document of `collection`, in insertion order.
    pub fn dump(&self, collection: &str) -> Vec<StoredDocument> {
        self.collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }
}

impl DocumentStore for MemoryStore {
    fn count(&self, collection: &str, query: &Query) -> Result<usize, StoreError> {
        Ok(self.find(collection, query)?.len())
    }

    fn find(&self, collection: &str, query: &Query) -> Result<Vec<StoredDocument>, StoreError> {
        let collections = self.collections.read().unwrap_or_else(PoisonError::into_inner);
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| query.matches(&d.body))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn insert(&self, collection: &str, document: Document) -> Result<DocumentId, StoreError> {
        let id = DocumentId(format!("{:016x}", self.next_id.fetch_add(1, Ordering::Relaxed)));
        self.collections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(collection.to_string())
            .or_default()
            .push(StoredDocument {
                id: id.clone(),
                body: document,
            });
        Ok(id)
    }

    fn update(&self, collection: &str, id: &DocumentId, patch: Document) -> Result<(), StoreError> {
        let mut collections = self.collections.write().unwrap_or_else(PoisonError::into_inner);
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| &d.id == id))
            .ok_or_else(|| StoreError::MissingDocument(id.clone()))?;
        doc.body.extend(patch);
        Ok(())
    }

    fn remove_all(&self, collection: &str, query: &Query) -> Result<usize, StoreError> {
        let mut collections = self.collections.write().unwrap_or_else(PoisonError::into_inner);
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|d| !query.matches(&d.body));
        Ok(before - docs.len())
    }
}
