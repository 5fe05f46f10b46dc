//! `and`, `or` and `not` over other filters. `and`/`or` short-circuit.

use crate::context::EvaluationContext;
use crate::error::BadSpecError;
use crate::factory::BuildCtx;
use crate::spec::Spec;
use crate::types::{Filter, FilterDefinition, FilterRef};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug)]
pub struct AndFilter {
    filters: Vec<FilterRef>,
}

impl Filter for AndFilter {
    fn matches(&self, doc: &Value, ctx: Option<&EvaluationContext>) -> bool {
        self.filters.iter().all(|filter| filter.matches(doc, ctx))
    }

    fn kind(&self) -> &'static str {
        "and"
    }
}

#[derive(Debug)]
pub struct OrFilter {
    filters: Vec<FilterRef>,
}

impl Filter for OrFilter {
    fn matches(&self, doc: &Value, ctx: Option<&EvaluationContext>) -> bool {
        self.filters.iter().any(|filter| filter.matches(doc, ctx))
    }

    fn kind(&self) -> &'static str {
        "or"
    }
}

#[derive(Debug)]
pub struct NotFilter {
    filter: FilterRef,
}

impl Filter for NotFilter {
    fn matches(&self, doc: &Value, ctx: Option<&EvaluationContext>) -> bool {
        !self.filter.matches(doc, ctx)
    }

    fn kind(&self) -> &'static str {
        "not"
    }
}

fn build_filters(spec: &Spec<'_>, ctx: &BuildCtx<'_>) -> Result<Vec<FilterRef>, BadSpecError> {
    spec.require_array("filters")?
        .iter()
        .map(|filter| ctx.filter(filter))
        .collect()
}

fn build_and(spec: &Spec<'_>, ctx: &BuildCtx<'_>) -> Result<FilterRef, BadSpecError> {
    Ok(Arc::new(AndFilter {
        filters: build_filters(spec, ctx)?,
    }))
}

fn build_or(spec: &Spec<'_>, ctx: &BuildCtx<'_>) -> Result<FilterRef, BadSpecError> {
    Ok(Arc::new(OrFilter {
        filters: build_filters(spec, ctx)?,
    }))
}

fn build_not(spec: &Spec<'_>, ctx: &BuildCtx<'_>) -> Result<FilterRef, BadSpecError> {
    Ok(Arc::new(NotFilter {
        filter: ctx.filter(spec.require("filter")?)?,
    }))
}

pub fn definitions() -> Vec<Arc<FilterDefinition>> {
    vec![
        Arc::new(FilterDefinition { name: "and", aliases: &[], build_fn: build_and }),
        Arc::new(FilterDefinition { name: "or", aliases: &[], build_fn: build_or }),
        Arc::new(FilterDefinition { name: "not", aliases: &[], build_fn: build_not }),
    ]
}
