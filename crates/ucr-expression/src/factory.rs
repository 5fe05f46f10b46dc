//! Builds expression and filter trees from specs.

use crate::config::FactoryConfig;
use crate::error::BadSpecError;
use crate::expressions::all_expressions;
use crate::filters::all_filters;
use crate::lookup::{DocumentLookup, NoLookup};
use crate::spec::Spec;
use crate::types::{
    expressions_to_map, filters_to_map, insert_definition, ExpressionDefinition, ExpressionMap,
    ExpressionRef, FilterDefinition, FilterMap, FilterRef,
};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Dispatches specs on their `type` to registered constructors.
///
/// New types are added with [`register_expression`](Self::register_expression)
/// and [`register_filter`](Self::register_filter) before the factory is
/// shared; the registries are read-only afterwards.
pub struct ExpressionFactory {
    expressions: ExpressionMap,
    filters: FilterMap,
    lookup: Arc<dyn DocumentLookup>,
    config: FactoryConfig,
}

impl Default for ExpressionFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExpressionFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut expressions: Vec<_> = self.expressions.keys().collect();
        expressions.sort();
        let mut filters: Vec<_> = self.filters.keys().collect();
        filters.sort();
        f.debug_struct("ExpressionFactory")
            .field("expressions", &expressions)
            .field("filters", &filters)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ExpressionFactory {
    /// A factory with every built-in type and no document lookup.
    pub fn new() -> Self {
        ExpressionFactory {
            expressions: expressions_to_map(all_expressions()),
            filters: filters_to_map(all_filters()),
            lookup: Arc::new(NoLookup),
            config: FactoryConfig::default(),
        }
    }

    pub fn with_lookup(mut self, lookup: Arc<dyn DocumentLookup>) -> Self {
        self.lookup = lookup;
        self
    }

    pub fn with_config(mut self, config: FactoryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn register_expression(mut self, def: ExpressionDefinition) -> Self {
        insert_definition(&mut self.expressions, Arc::new(def));
        self
    }

    pub fn register_filter(mut self, def: FilterDefinition) -> Self {
        insert_definition(&mut self.filters, Arc::new(def));
        self
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    /// Builds an expression tree, validating every node on the way down.
    pub fn from_spec(&self, spec: &Value) -> Result<ExpressionRef, BadSpecError> {
        let tree = BuildCtx::root(self).expression(spec)?;
        debug!(kind = tree.kind(), "built expression tree");
        Ok(tree)
    }

    /// Builds a filter tree.
    pub fn filter_from_spec(&self, spec: &Value) -> Result<FilterRef, BadSpecError> {
        let tree = BuildCtx::root(self).filter(spec)?;
        debug!(kind = tree.kind(), "built filter tree");
        Ok(tree)
    }
}

/// Passed to constructors so they can build their child specs.
///
/// Tracks nesting depth and exposes the factory's lookup and config.
pub struct BuildCtx<'a> {
    factory: &'a ExpressionFactory,
    depth: usize,
}

impl<'a> BuildCtx<'a> {
    fn root(factory: &'a ExpressionFactory) -> Self {
        BuildCtx { factory, depth: 0 }
    }

    fn descend(&self) -> Result<BuildCtx<'a>, BadSpecError> {
        let depth = self.depth + 1;
        let max_depth = self.factory.config.max_depth;
        if depth > max_depth {
            return Err(BadSpecError::TooDeep { max_depth });
        }
        Ok(BuildCtx {
            factory: self.factory,
            depth,
        })
    }

    /// Builds a nested expression spec.
    pub fn expression(&self, spec: &Value) -> Result<ExpressionRef, BadSpecError> {
        let child = self.descend()?;
        let spec = Spec::parse(spec)?;
        let def = self
            .factory
            .expressions
            .get(spec.kind())
            .ok_or_else(|| BadSpecError::UnknownType {
                category: "expression",
                type_name: spec.kind().to_string(),
            })?;
        (def.build_fn)(&spec, &child)
    }

    /// Builds a nested filter spec.
    pub fn filter(&self, spec: &Value) -> Result<FilterRef, BadSpecError> {
        let child = self.descend()?;
        let spec = Spec::parse(spec)?;
        let def = self
            .factory
            .filters
            .get(spec.kind())
            .ok_or_else(|| BadSpecError::UnknownType {
                category: "filter",
                type_name: spec.kind().to_string(),
            })?;
        (def.build_fn)(&spec, &child)
    }

    pub fn lookup(&self) -> Arc<dyn DocumentLookup> {
        Arc::clone(&self.factory.lookup)
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.factory.config
    }
}
