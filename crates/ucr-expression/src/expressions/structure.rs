//! Expressions that reshape values: chaining, indexing, and building
//! objects and lists.

use crate::context::EvaluationContext;
use crate::error::BadSpecError;
use crate::factory::BuildCtx;
use crate::spec::Spec;
use crate::types::{Expression, ExpressionDefinition, ExpressionRef, FilterRef};
use serde_json::{Map, Value};
use std::any::Any;
use std::sync::Arc;

/// Evaluates `value_expression` against the result of `argument_expression`.
#[derive(Debug)]
pub struct NestedExpression {
    argument_expression: ExpressionRef,
    value_expression: ExpressionRef,
}

impl Expression for NestedExpression {
    fn evaluate(&self, doc: &Value, ctx: Option<&EvaluationContext>) -> Value {
        let argument = self.argument_expression.evaluate(doc, ctx);
        self.value_expression.evaluate(&argument, ctx)
    }

    fn kind(&self) -> &'static str {
        "nested"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
pub struct ArrayIndexExpression {
    array_expression: ExpressionRef,
    index_expression: ExpressionRef,
}

impl Expression for ArrayIndexExpression {
    fn evaluate(&self, doc: &Value, ctx: Option<&EvaluationContext>) -> Value {
        let array = self.array_expression.evaluate(doc, ctx);
        let index = self.index_expression.evaluate(doc, ctx);
        let index = index.as_u64().and_then(|i| usize::try_from(i).ok());
        match (array, index) {
            (Value::Array(mut items), Some(i)) if i < items.len() => items.swap_remove(i),
            _ => Value::Null,
        }
    }

    fn kind(&self) -> &'static str {
        "array_index"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Builds an object, one expression per key.
#[derive(Debug)]
pub struct DictExpression {
    properties: Vec<(String, ExpressionRef)>,
}

impl Expression for DictExpression {
    fn evaluate(&self, doc: &Value, ctx: Option<&EvaluationContext>) -> Value {
        let mut out = Map::new();
        for (key, expression) in &self.properties {
            out.insert(key.clone(), expression.evaluate(doc, ctx));
        }
        Value::Object(out)
    }

    fn kind(&self) -> &'static str {
        "dict"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Builds a list from several expressions, optionally keeping only the
/// values that pass `test`.
#[derive(Debug)]
pub struct IteratorExpression {
    expressions: Vec<ExpressionRef>,
    test: Option<FilterRef>,
}

impl Expression for IteratorExpression {
    fn evaluate(&self, doc: &Value, ctx: Option<&EvaluationContext>) -> Value {
        let values = self
            .expressions
            .iter()
            .map(|expression| expression.evaluate(doc, ctx))
            .filter(|value| match &self.test {
                Some(test) => test.matches(value, ctx),
                None => true,
            })
            .collect();
        Value::Array(values)
    }

    fn kind(&self) -> &'static str {
        "iterator"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn build_nested(spec: &Spec<'_>, ctx: &BuildCtx<'_>) -> Result<ExpressionRef, BadSpecError> {
    Ok(Arc::new(NestedExpression {
        argument_expression: ctx.expression(spec.require("argument_expression")?)?,
        value_expression: ctx.expression(spec.require("value_expression")?)?,
    }))
}

fn build_array_index(spec: &Spec<'_>, ctx: &BuildCtx<'_>) -> Result<ExpressionRef, BadSpecError> {
    Ok(Arc::new(ArrayIndexExpression {
        array_expression: ctx.expression(spec.require("array_expression")?)?,
        index_expression: ctx.expression(spec.require("index_expression")?)?,
    }))
}

fn build_dict(spec: &Spec<'_>, ctx: &BuildCtx<'_>) -> Result<ExpressionRef, BadSpecError> {
    let properties = spec
        .require_object("properties")?
        .iter()
        .map(|(key, property)| Ok((key.clone(), ctx.expression(property)?)))
        .collect::<Result<Vec<_>, BadSpecError>>()?;
    Ok(Arc::new(DictExpression { properties }))
}

fn build_iterator(spec: &Spec<'_>, ctx: &BuildCtx<'_>) -> Result<ExpressionRef, BadSpecError> {
    let expressions = spec
        .require_array("expressions")?
        .iter()
        .map(|expression| ctx.expression(expression))
        .collect::<Result<Vec<_>, BadSpecError>>()?;
    let test = spec.optional("test").map(|test| ctx.filter(test)).transpose()?;
    Ok(Arc::new(IteratorExpression { expressions, test }))
}

pub fn definitions() -> Vec<Arc<ExpressionDefinition>> {
    vec![
        Arc::new(ExpressionDefinition { name: "nested", aliases: &[], build_fn: build_nested }),
        Arc::new(ExpressionDefinition { name: "array_index", aliases: &[], build_fn: build_array_index }),
        Arc::new(ExpressionDefinition { name: "dict", aliases: &[], build_fn: build_dict }),
        Arc::new(ExpressionDefinition { name: "iterator", aliases: &[], build_fn: build_iterator }),
    ]
}
