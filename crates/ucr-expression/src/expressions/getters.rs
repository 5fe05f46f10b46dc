//! Expressions that read values straight off the current document.

use crate::context::EvaluationContext;
use crate::error::BadSpecError;
use crate::factory::BuildCtx;
use crate::spec::Spec;
use crate::types::{ExpressionDefinition, ExpressionRef, Expression};
use crate::util;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;

/// Returns a fixed literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantExpression {
    constant: Value,
}

impl ConstantExpression {
    pub fn constant(&self) -> &Value {
        &self.constant
    }
}

impl Expression for ConstantExpression {
    fn evaluate(&self, _doc: &Value, _ctx: Option<&EvaluationContext>) -> Value {
        self.constant.clone()
    }

    fn kind(&self) -> &'static str {
        "constant"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Reads a single top-level property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyNameExpression {
    property_name: String,
}

impl PropertyNameExpression {
    pub fn new(property_name: impl Into<String>) -> Self {
        PropertyNameExpression {
            property_name: property_name.into(),
        }
    }

    pub fn property_name(&self) -> &str {
        &self.property_name
    }
}

impl Expression for PropertyNameExpression {
    fn evaluate(&self, doc: &Value, _ctx: Option<&EvaluationContext>) -> Value {
        doc.get(&self.property_name).cloned().unwrap_or(Value::Null)
    }

    fn kind(&self) -> &'static str {
        "property_name"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Walks a list of keys through nested objects.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyPathExpression {
    property_path: Vec<String>,
}

impl PropertyPathExpression {
    pub fn new(property_path: Vec<String>) -> Self {
        PropertyPathExpression { property_path }
    }

    pub fn property_path(&self) -> &[String] {
        &self.property_path
    }
}

impl Expression for PropertyPathExpression {
    fn evaluate(&self, doc: &Value, _ctx: Option<&EvaluationContext>) -> Value {
        util::walk_path(doc, &self.property_path)
            .cloned()
            .unwrap_or(Value::Null)
    }

    fn kind(&self) -> &'static str {
        "property_path"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Returns the current document itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdentityExpression;

impl Expression for IdentityExpression {
    fn evaluate(&self, doc: &Value, _ctx: Option<&EvaluationContext>) -> Value {
        doc.clone()
    }

    fn kind(&self) -> &'static str {
        "identity"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn build_constant(spec: &Spec<'_>, _ctx: &BuildCtx<'_>) -> Result<ExpressionRef, BadSpecError> {
    // `{"constant": null}` is a valid null literal; only an absent key is rejected.
    let constant = spec.require_present("constant")?.clone();
    Ok(Arc::new(ConstantExpression { constant }))
}

fn build_property_name(spec: &Spec<'_>, _ctx: &BuildCtx<'_>) -> Result<ExpressionRef, BadSpecError> {
    let name = spec.require_str("property_name")?;
    Ok(Arc::new(PropertyNameExpression::new(name)))
}

fn build_property_path(spec: &Spec<'_>, _ctx: &BuildCtx<'_>) -> Result<ExpressionRef, BadSpecError> {
    let path = spec.require_path("property_path")?;
    Ok(Arc::new(PropertyPathExpression::new(path)))
}

fn build_identity(_spec: &Spec<'_>, _ctx: &BuildCtx<'_>) -> Result<ExpressionRef, BadSpecError> {
    Ok(Arc::new(IdentityExpression))
}

pub fn definitions() -> Vec<Arc<ExpressionDefinition>> {
    vec![
        Arc::new(ExpressionDefinition { name: "constant", aliases: &[], build_fn: build_constant }),
        Arc::new(ExpressionDefinition { name: "property_name", aliases: &[], build_fn: build_property_name }),
        Arc::new(ExpressionDefinition { name: "property_path", aliases: &[], build_fn: build_property_path }),
        Arc::new(ExpressionDefinition { name: "identity", aliases: &[], build_fn: build_identity }),
    ]
}
