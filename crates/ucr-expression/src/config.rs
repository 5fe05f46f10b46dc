use serde::Deserialize;

/// Settings applied while building expression trees.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// Deepest allowed nesting of specs. Deeper specs are rejected at build time.
    pub max_depth: usize,
    /// Memoize related-document lookups in the evaluation context.
    pub cache_related_docs: bool,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        FactoryConfig {
            max_depth: 64,
            cache_related_docs: true,
        }
    }
}

impl FactoryConfig {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
