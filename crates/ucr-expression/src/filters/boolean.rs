//! Filters that compare an expression's value against a literal.

use super::operators::Operator;
use crate::context::EvaluationContext;
use crate::error::BadSpecError;
use crate::expressions::{PropertyNameExpression, PropertyPathExpression};
use crate::factory::BuildCtx;
use crate::spec::Spec;
use crate::types::{ExpressionRef, Filter, FilterDefinition, FilterRef};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug)]
pub struct BooleanExpressionFilter {
    expression: ExpressionRef,
    operator: Operator,
    property_value: Value,
}

impl BooleanExpressionFilter {
    pub fn operator(&self) -> Operator {
        self.operator
    }
}

impl Filter for BooleanExpressionFilter {
    fn matches(&self, doc: &Value, ctx: Option<&EvaluationContext>) -> bool {
        let left = self.expression.evaluate(doc, ctx);
        self.operator.apply(&left, &self.property_value)
    }

    fn kind(&self) -> &'static str {
        "boolean_expression"
    }
}

fn build_boolean_expression(spec: &Spec<'_>, ctx: &BuildCtx<'_>) -> Result<FilterRef, BadSpecError> {
    let expression = ctx.expression(spec.require("expression")?)?;
    let property_value = spec.require_present("property_value")?.clone();
    let operator = Operator::from_spec(spec, &property_value)?;
    Ok(Arc::new(BooleanExpressionFilter {
        expression,
        operator,
        property_value,
    }))
}

/// Shorthand for `eq` against a property name or path.
fn build_property_match(spec: &Spec<'_>, _ctx: &BuildCtx<'_>) -> Result<FilterRef, BadSpecError> {
    let expression: ExpressionRef = if spec.optional("property_name").is_some() {
        Arc::new(PropertyNameExpression::new(spec.require_str("property_name")?))
    } else if spec.optional("property_path").is_some() {
        Arc::new(PropertyPathExpression::new(spec.require_path("property_path")?))
    } else {
        return Err(BadSpecError::missing(spec.kind(), "property_name"));
    };
    Ok(Arc::new(BooleanExpressionFilter {
        expression,
        operator: Operator::Eq,
        property_value: spec.require_present("property_value")?.clone(),
    }))
}

pub fn definitions() -> Vec<Arc<FilterDefinition>> {
    vec![
        Arc::new(FilterDefinition { name: "boolean_expression", aliases: &[], build_fn: build_boolean_expression }),
        Arc::new(FilterDefinition { name: "property_match", aliases: &[], build_fn: build_property_match }),
    ]
}
