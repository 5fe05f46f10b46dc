//! Expressions that choose between sub-expressions.
//!
//! Only the chosen sub-expression is evaluated. This matters because an
//! untaken branch may contain a `related_doc` lookup.

use crate::context::EvaluationContext;
use crate::error::BadSpecError;
use crate::factory::BuildCtx;
use crate::spec::Spec;
use crate::types::{Expression, ExpressionDefinition, ExpressionRef, FilterRef};
use crate::util;
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug)]
pub struct ConditionalExpression {
    test: FilterRef,
    if_true: ExpressionRef,
    if_false: ExpressionRef,
}

impl Expression for ConditionalExpression {
    fn evaluate(&self, doc: &Value, ctx: Option<&EvaluationContext>) -> Value {
        if self.test.matches(doc, ctx) {
            self.if_true.evaluate(doc, ctx)
        } else {
            self.if_false.evaluate(doc, ctx)
        }
    }

    fn kind(&self) -> &'static str {
        "conditional"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Picks a case by the string form of `switch_on`'s value.
#[derive(Debug)]
pub struct SwitchExpression {
    switch_on: ExpressionRef,
    cases: HashMap<String, ExpressionRef>,
    default: ExpressionRef,
}

impl Expression for SwitchExpression {
    fn evaluate(&self, doc: &Value, ctx: Option<&EvaluationContext>) -> Value {
        let key = util::scalar_key(&self.switch_on.evaluate(doc, ctx));
        let branch = key
            .and_then(|key| self.cases.get(&key))
            .unwrap_or(&self.default);
        branch.evaluate(doc, ctx)
    }

    fn kind(&self) -> &'static str {
        "switch"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Falls back to `default_expression` when the value is null or empty.
#[derive(Debug)]
pub struct CoalesceExpression {
    expression: ExpressionRef,
    default_expression: ExpressionRef,
}

impl Expression for CoalesceExpression {
    fn evaluate(&self, doc: &Value, ctx: Option<&EvaluationContext>) -> Value {
        match self.expression.evaluate(doc, ctx) {
            Value::Null => self.default_expression.evaluate(doc, ctx),
            Value::String(s) if s.is_empty() => self.default_expression.evaluate(doc, ctx),
            value => value,
        }
    }

    fn kind(&self) -> &'static str {
        "coalesce"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn build_conditional(spec: &Spec<'_>, ctx: &BuildCtx<'_>) -> Result<ExpressionRef, BadSpecError> {
    Ok(Arc::new(ConditionalExpression {
        test: ctx.filter(spec.require("test")?)?,
        if_true: ctx.expression(spec.require("expression_if_true")?)?,
        if_false: ctx.expression(spec.require("expression_if_false")?)?,
    }))
}

fn build_switch(spec: &Spec<'_>, ctx: &BuildCtx<'_>) -> Result<ExpressionRef, BadSpecError> {
    let switch_on = ctx.expression(spec.require("switch_on")?)?;
    let cases = spec
        .require_object("cases")?
        .iter()
        .map(|(key, case)| Ok((key.clone(), ctx.expression(case)?)))
        .collect::<Result<HashMap<_, _>, BadSpecError>>()?;
    let default = ctx.expression(spec.require("default")?)?;
    Ok(Arc::new(SwitchExpression {
        switch_on,
        cases,
        default,
    }))
}

fn build_coalesce(spec: &Spec<'_>, ctx: &BuildCtx<'_>) -> Result<ExpressionRef, BadSpecError> {
    Ok(Arc::new(CoalesceExpression {
        expression: ctx.expression(spec.require("expression")?)?,
        default_expression: ctx.expression(spec.require("default_expression")?)?,
    }))
}

pub fn definitions() -> Vec<Arc<ExpressionDefinition>> {
    vec![
        Arc::new(ExpressionDefinition { name: "conditional", aliases: &[], build_fn: build_conditional }),
        Arc::new(ExpressionDefinition { name: "switch", aliases: &[], build_fn: build_switch }),
        Arc::new(ExpressionDefinition { name: "coalesce", aliases: &[], build_fn: build_coalesce }),
    ]
}
