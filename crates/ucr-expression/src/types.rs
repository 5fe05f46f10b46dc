use crate::context::EvaluationContext;
use crate::error::BadSpecError;
use crate::factory::BuildCtx;
use crate::spec::Spec;
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A node of a built expression tree.
///
/// Trees are immutable once built and can be shared across threads.
pub trait Expression: fmt::Debug + Send + Sync {
    /// Evaluates the node. Missing data yields `Value::Null`, never an error.
    fn evaluate(&self, doc: &Value, ctx: Option<&EvaluationContext>) -> Value;

    /// The `type` discriminator this node was built from.
    fn kind(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;
}

/// A boolean test over a document, used by `conditional` and `iterator`.
pub trait Filter: fmt::Debug + Send + Sync {
    fn matches(&self, doc: &Value, ctx: Option<&EvaluationContext>) -> bool;

    fn kind(&self) -> &'static str;
}

pub type ExpressionRef = Arc<dyn Expression>;
pub type FilterRef = Arc<dyn Filter>;

pub type BuildExpressionFn = fn(&Spec<'_>, &BuildCtx<'_>) -> Result<ExpressionRef, BadSpecError>;
pub type BuildFilterFn = fn(&Spec<'_>, &BuildCtx<'_>) -> Result<FilterRef, BadSpecError>;

/// Registry entry for an expression type.
pub struct ExpressionDefinition {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub build_fn: BuildExpressionFn,
}

/// Registry entry for a filter type.
pub struct FilterDefinition {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub build_fn: BuildFilterFn,
}

pub type ExpressionMap = HashMap<String, Arc<ExpressionDefinition>>;
pub type FilterMap = HashMap<String, Arc<FilterDefinition>>;

/// Anything registered under a name and optional aliases.
pub trait Named {
    fn name(&self) -> &'static str;
    fn aliases(&self) -> &'static [&'static str];
}

impl Named for ExpressionDefinition {
    fn name(&self) -> &'static str {
        self.name
    }

    fn aliases(&self) -> &'static [&'static str] {
        self.aliases
    }
}

impl Named for FilterDefinition {
    fn name(&self) -> &'static str {
        self.name
    }

    fn aliases(&self) -> &'static [&'static str] {
        self.aliases
    }
}

/// Inserts `def` under its name and every alias, replacing earlier entries.
pub fn insert_definition<D: Named>(map: &mut HashMap<String, Arc<D>>, def: Arc<D>) {
    for alias in def.aliases() {
        map.insert(alias.to_string(), Arc::clone(&def));
    }
    map.insert(def.name().to_string(), def);
}

pub fn expressions_to_map(definitions: Vec<Arc<ExpressionDefinition>>) -> ExpressionMap {
    let mut map = HashMap::new();
    for def in definitions {
        insert_definition(&mut map, def);
    }
    map
}

pub fn filters_to_map(definitions: Vec<Arc<FilterDefinition>>) -> FilterMap {
    let mut map = HashMap::new();
    for def in definitions {
        insert_definition(&mut map, def);
    }
    map
}
