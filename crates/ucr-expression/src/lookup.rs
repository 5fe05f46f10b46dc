//! Document lookup provider used by `related_doc` expressions.
//!
//! The engine only needs "give me the store for this doc type" and "give me
//! the document with this id". A miss at either step is not an error.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// A store of documents of one type, addressed by id.
pub trait DocumentStore: Send + Sync {
    fn get(&self, id: &str) -> Option<Value>;
}

/// Resolves a doc type to the store holding documents of that type.
pub trait DocumentLookup: Send + Sync {
    fn get_store(&self, doc_type: &str) -> Option<Arc<dyn DocumentStore>>;
}

/// A provider with no stores; every related lookup misses.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLookup;

impl DocumentLookup for NoLookup {
    fn get_store(&self, _doc_type: &str) -> Option<Arc<dyn DocumentStore>> {
        None
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    docs: HashMap<String, Value>,
}

impl InMemoryStore {
    pub fn insert(&mut self, id: impl Into<String>, doc: Value) {
        self.docs.insert(id.into(), doc);
    }
}

impl DocumentStore for InMemoryStore {
    fn get(&self, id: &str) -> Option<Value> {
        self.docs.get(id).cloned()
    }
}

/// In-memory documents grouped by doc type.
#[derive(Debug, Default, Clone)]
pub struct InMemoryLookup {
    stores: HashMap<String, Arc<InMemoryStore>>,
}

impl InMemoryLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_doc(mut self, doc_type: &str, id: impl Into<String>, doc: Value) -> Self {
        self.insert(doc_type, id, doc);
        self
    }

    pub fn insert(&mut self, doc_type: &str, id: impl Into<String>, doc: Value) {
        let store = self.stores.entry(doc_type.to_string()).or_default();
        Arc::make_mut(store).insert(id, doc);
    }

    /// Builds a lookup from `{"<doc_type>": {"<id>": <doc>, ...}, ...}`.
    ///
    /// Returns `None` when the value does not have that shape.
    pub fn from_json(value: &Value) -> Option<Self> {
        let mut lookup = InMemoryLookup::new();
        for (doc_type, docs) in value.as_object()? {
            for (id, doc) in docs.as_object()? {
                lookup.insert(doc_type, id.as_str(), doc.clone());
            }
        }
        Some(lookup)
    }
}

impl DocumentLookup for InMemoryLookup {
    fn get_store(&self, doc_type: &str) -> Option<Arc<dyn DocumentStore>> {
        self.stores
            .get(doc_type)
            .map(|store| Arc::clone(store) as Arc<dyn DocumentStore>)
    }
}
