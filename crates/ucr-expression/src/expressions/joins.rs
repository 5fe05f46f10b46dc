//! Expressions that leave the current document: back to the root document,
//! or across to a related one.

use crate::context::EvaluationContext;
use crate::error::BadSpecError;
use crate::factory::BuildCtx;
use crate::lookup::DocumentLookup;
use crate::spec::Spec;
use crate::types::{Expression, ExpressionDefinition, ExpressionRef};
use crate::util;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::{trace, warn};

/// Evaluates `expression` against the context's root document.
///
/// Without a context there is no root document and the result is null; the
/// current document is never used as a fallback.
#[derive(Debug)]
pub struct RootDocExpression {
    expression: ExpressionRef,
}

impl Expression for RootDocExpression {
    fn evaluate(&self, _doc: &Value, ctx: Option<&EvaluationContext>) -> Value {
        match ctx {
            Some(ctx) => self.expression.evaluate(ctx.root_doc(), Some(ctx)),
            None => Value::Null,
        }
    }

    fn kind(&self) -> &'static str {
        "root_doc"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Joins to a document of `related_doc_type` whose id comes from the current
/// document, then evaluates `value_expression` against it.
///
/// The context is passed through unchanged, so `root_doc` inside
/// `value_expression` still sees the top-level document.
pub struct RelatedDocExpression {
    related_doc_type: String,
    doc_id_expression: ExpressionRef,
    value_expression: ExpressionRef,
    lookup: Arc<dyn DocumentLookup>,
    cache: bool,
}

impl fmt::Debug for RelatedDocExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelatedDocExpression")
            .field("related_doc_type", &self.related_doc_type)
            .field("doc_id_expression", &self.doc_id_expression)
            .field("value_expression", &self.value_expression)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl RelatedDocExpression {
    pub fn related_doc_type(&self) -> &str {
        &self.related_doc_type
    }

    fn fetch(&self, id: &str, ctx: Option<&EvaluationContext>) -> Option<Value> {
        let cache = if self.cache { ctx } else { None };
        if let Some(hit) = cache.and_then(|ctx| ctx.cached(&self.related_doc_type, id)) {
            trace!(doc_type = %self.related_doc_type, id, "related doc cache hit");
            return hit;
        }

        let doc = match self.lookup.get_store(&self.related_doc_type) {
            Some(store) => store.get(id),
            None => {
                warn!(doc_type = %self.related_doc_type, "no document store for doc type");
                None
            }
        };
        trace!(doc_type = %self.related_doc_type, id, found = doc.is_some(), "related doc lookup");

        if let Some(ctx) = cache {
            ctx.remember(&self.related_doc_type, id, doc.clone());
        }
        doc
    }
}

impl Expression for RelatedDocExpression {
    fn evaluate(&self, doc: &Value, ctx: Option<&EvaluationContext>) -> Value {
        let Some(id) = util::doc_id(&self.doc_id_expression.evaluate(doc, ctx)) else {
            return Value::Null;
        };
        match self.fetch(&id, ctx) {
            Some(related) => self.value_expression.evaluate(&related, ctx),
            None => Value::Null,
        }
    }

    fn kind(&self) -> &'static str {
        "related_doc"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn build_root_doc(spec: &Spec<'_>, ctx: &BuildCtx<'_>) -> Result<ExpressionRef, BadSpecError> {
    Ok(Arc::new(RootDocExpression {
        expression: ctx.expression(spec.require("expression")?)?,
    }))
}

fn build_related_doc(spec: &Spec<'_>, ctx: &BuildCtx<'_>) -> Result<ExpressionRef, BadSpecError> {
    Ok(Arc::new(RelatedDocExpression {
        related_doc_type: spec.require_str("related_doc_type")?.to_string(),
        doc_id_expression: ctx.expression(spec.require("doc_id_expression")?)?,
        value_expression: ctx.expression(spec.require("value_expression")?)?,
        lookup: ctx.lookup(),
        cache: ctx.config().cache_related_docs,
    }))
}

pub fn definitions() -> Vec<Arc<ExpressionDefinition>> {
    vec![
        Arc::new(ExpressionDefinition { name: "root_doc", aliases: &[], build_fn: build_root_doc }),
        Arc::new(ExpressionDefinition { name: "related_doc", aliases: &[], build_fn: build_related_doc }),
    ]
}
