//! Built-in filter types.

pub mod boolean;
pub mod logical;
pub mod operators;

use crate::types::FilterDefinition;
use std::sync::Arc;

pub use boolean::BooleanExpressionFilter;
pub use logical::{AndFilter, NotFilter, OrFilter};
pub use operators::Operator;

/// Every built-in filter definition.
pub fn all_filters() -> Vec<Arc<FilterDefinition>> {
    let mut defs = Vec::new();
    defs.extend(boolean::definitions());
    defs.extend(logical::definitions());
    defs
}
