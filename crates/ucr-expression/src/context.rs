use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;

/// State for one top-level evaluation.
///
/// Holds the root document that `root_doc` expressions jump back to, and a
/// cache of related documents already fetched during this evaluation. The
/// cache is the only part that changes while a tree is being evaluated.
#[derive(Debug, Default)]
pub struct EvaluationContext {
    root_doc: Value,
    related: RefCell<HashMap<(String, String), Option<Value>>>,
}

impl EvaluationContext {
    pub fn new(root_doc: Value) -> Self {
        EvaluationContext {
            root_doc,
            related: RefCell::new(HashMap::new()),
        }
    }

    pub fn root_doc(&self) -> &Value {
        &self.root_doc
    }

    /// Returns a previous lookup result; the inner `None` records a miss.
    pub fn cached(&self, doc_type: &str, id: &str) -> Option<Option<Value>> {
        self.related
            .borrow()
            .get(&(doc_type.to_string(), id.to_string()))
            .cloned()
    }

    pub fn remember(&self, doc_type: &str, id: &str, doc: Option<Value>) {
        self.related
            .borrow_mut()
            .insert((doc_type.to_string(), id.to_string()), doc);
    }

    /// Number of lookups memoized so far.
    pub fn cached_len(&self) -> usize {
        self.related.borrow().len()
    }
}
