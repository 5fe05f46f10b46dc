//! Built-in expression types.

pub mod branching;
pub mod getters;
pub mod joins;
pub mod structure;

use crate::types::ExpressionDefinition;
use std::sync::Arc;

pub use branching::{CoalesceExpression, ConditionalExpression, SwitchExpression};
pub use getters::{
    ConstantExpression, IdentityExpression, PropertyNameExpression, PropertyPathExpression,
};
pub use joins::{RelatedDocExpression, RootDocExpression};
pub use structure::{ArrayIndexExpression, DictExpression, IteratorExpression, NestedExpression};

/// Every built-in expression definition.
pub fn all_expressions() -> Vec<Arc<ExpressionDefinition>> {
    let mut defs = Vec::new();
    defs.extend(getters::definitions());
    defs.extend(branching::definitions());
    defs.extend(joins::definitions());
    defs.extend(structure::definitions());
    defs
}
