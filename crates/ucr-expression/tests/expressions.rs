//! Integration tests for building and evaluating expression specs.

use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use ucr_expression::expressions::{PropertyNameExpression, PropertyPathExpression};
use ucr_expression::{
    from_spec, BadSpecError, DocumentLookup, DocumentStore, EvaluationContext, Expression,
    ExpressionFactory, ExpressionRef, FactoryConfig, InMemoryLookup,
};

fn build(spec: Value) -> ExpressionRef {
    from_spec(&spec).unwrap_or_else(|e| panic!("from_spec({}) failed: {}", spec, e))
}

fn build_err(spec: Value) -> BadSpecError {
    from_spec(&spec)
        .err()
        .unwrap_or_else(|| panic!("expected BadSpecError for {}", spec))
}

fn prop(name: &str) -> Value {
    json!({"type": "property_name", "property_name": name})
}

// ----------------------------------------------------------------- Constant

#[test]
fn test_constant_returns_literal() {
    for constant in [json!(7.2), json!("hello world"), json!(["a", "list"]), json!({"a": "dict"})] {
        let expr = build(json!({"type": "constant", "constant": constant}));
        assert_eq!(expr.evaluate(&json!({}), None), constant);
        assert_eq!(expr.evaluate(&json!({"some": "random stuff"}), None), constant);
    }
}

#[test]
fn test_constant_null_is_allowed() {
    let expr = build(json!({"type": "constant", "constant": null}));
    assert_eq!(expr.evaluate(&json!({"a": 1}), None), Value::Null);
}

#[test]
fn test_constant_missing_key() {
    let err = build_err(json!({"type": "constant"}));
    assert_eq!(err, BadSpecError::missing("constant", "constant"));
}

// ----------------------------------------------------------------- Type dispatch

#[test]
fn test_invalid_type() {
    let err = build_err(json!({"type": "not_a_valid_type"}));
    assert!(matches!(err, BadSpecError::UnknownType { .. }), "got: {:?}", err);
}

#[test]
fn test_missing_type_and_non_object() {
    assert_eq!(build_err(json!({"property_name": "foo"})), BadSpecError::MissingType);
    assert!(matches!(build_err(json!("foo")), BadSpecError::NotAnObject { .. }));
}

#[test]
fn test_unknown_fields_are_ignored() {
    let expr = build(json!({"type": "property_name", "property_name": "foo", "datatype": "string"}));
    assert_eq!(expr.evaluate(&json!({"foo": "bar"}), None), json!("bar"));
}

// ----------------------------------------------------------------- Getters

#[test]
fn test_property_name_expression() {
    let expr = build(prop("foo"));
    assert_eq!(expr.kind(), "property_name");
    let getter = expr
        .as_any()
        .downcast_ref::<PropertyNameExpression>()
        .expect("property_name node");
    assert_eq!(getter.property_name(), "foo");
    assert_eq!(expr.evaluate(&json!({"foo": 3}), None), json!(3));
    assert_eq!(expr.evaluate(&json!({"bar": 3}), None), Value::Null);
    assert_eq!(expr.evaluate(&json!("not a doc"), None), Value::Null);
}

#[test]
fn test_property_name_no_name() {
    assert!(matches!(
        build_err(json!({"type": "property_name"})),
        BadSpecError::MissingField { .. }
    ));
}

#[test]
fn test_property_name_empty_name() {
    build_err(json!({"type": "property_name", "property_name": null}));
    build_err(json!({"type": "property_name", "property_name": ""}));
}

#[test]
fn test_property_path_expression() {
    let expr = build(json!({"type": "property_path", "property_path": ["path", "to", "foo"]}));
    let getter = expr
        .as_any()
        .downcast_ref::<PropertyPathExpression>()
        .expect("property_path node");
    assert_eq!(getter.property_path(), ["path", "to", "foo"]);
    assert_eq!(
        expr.evaluate(&json!({"path": {"to": {"foo": "found"}}}), None),
        json!("found")
    );
    assert_eq!(expr.evaluate(&json!({"path": {"to": "leaf"}}), None), Value::Null);
    assert_eq!(expr.evaluate(&json!({"path": {}}), None), Value::Null);
}

#[test]
fn test_property_path_no_path() {
    build_err(json!({"type": "property_path"}));
}

#[test]
fn test_property_path_empty_path() {
    for empty_path in [json!([]), Value::Null] {
        build_err(json!({"type": "property_path", "property_path": empty_path}));
    }
}

#[test]
fn test_identity() {
    let expr = build(json!({"type": "identity"}));
    assert_eq!(expr.evaluate(&json!({"a": [1, 2]}), None), json!({"a": [1, 2]}));
}

// ----------------------------------------------------------------- Conditional

fn conditional() -> ExpressionRef {
    build(json!({
        "type": "conditional",
        "test": {
            "type": "boolean_expression",
            "expression": prop("test"),
            "operator": "eq",
            "property_value": "match",
        },
        "expression_if_true": prop("true_value"),
        "expression_if_false": prop("false_value"),
    }))
}

#[test]
fn test_condition_is_true() {
    let doc = json!({"test": "match", "true_value": "correct", "false_value": "incorrect"});
    assert_eq!(conditional().evaluate(&doc, None), json!("correct"));
}

#[test]
fn test_condition_is_false() {
    let doc = json!({"test": "non-match", "true_value": "correct", "false_value": "incorrect"});
    assert_eq!(conditional().evaluate(&doc, None), json!("incorrect"));
}

#[test]
fn test_condition_is_missing() {
    let doc = json!({"true_value": "correct", "false_value": "incorrect"});
    assert_eq!(conditional().evaluate(&doc, None), json!("incorrect"));
}

#[test]
fn test_result_is_missing() {
    let doc = json!({"test": "match", "false_value": "incorrect"});
    assert_eq!(conditional().evaluate(&doc, None), Value::Null);
}

#[test]
fn test_conditional_bad_nested_spec() {
    let err = build_err(json!({
        "type": "conditional",
        "test": {"type": "boolean_expression", "expression": prop("x"), "operator": "eq", "property_value": 1},
        "expression_if_true": {"type": "property_path", "property_path": []},
        "expression_if_false": prop("y"),
    }));
    assert!(matches!(err, BadSpecError::InvalidField { ref node_type, .. } if node_type == "property_path"));
}

#[test]
fn test_conditional_requires_a_filter_test() {
    let err = build_err(json!({
        "type": "conditional",
        "test": prop("x"),
        "expression_if_true": prop("a"),
        "expression_if_false": prop("b"),
    }));
    assert!(matches!(err, BadSpecError::UnknownType { category: "filter", .. }));
}

// ----------------------------------------------------------------- Root doc

fn root_doc() -> ExpressionRef {
    build(json!({"type": "root_doc", "expression": prop("base_property")}))
}

#[test]
fn test_root_doc_missing_context() {
    assert_eq!(root_doc().evaluate(&json!({"base_property": "item_value"}), None), Value::Null);
}

#[test]
fn test_root_doc_not_in_context() {
    let ctx = EvaluationContext::new(json!({}));
    assert_eq!(
        root_doc().evaluate(&json!({"base_property": "item_value"}), Some(&ctx)),
        Value::Null
    );
}

#[test]
fn test_root_doc_comes_from_context() {
    let ctx = EvaluationContext::new(json!({"base_property": "base_value"}));
    assert_eq!(
        root_doc().evaluate(&json!({"base_property": "item_value"}), Some(&ctx)),
        json!("base_value")
    );
}

// ----------------------------------------------------------------- Related doc

/// Counts store lookups so tests can check laziness and caching.
#[derive(Default)]
struct CountingLookup {
    docs: InMemoryLookup,
    gets: Arc<AtomicUsize>,
}

struct CountingStore {
    inner: Arc<dyn DocumentStore>,
    gets: Arc<AtomicUsize>,
}

impl DocumentStore for CountingStore {
    fn get(&self, id: &str) -> Option<Value> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(id)
    }
}

impl DocumentLookup for CountingLookup {
    fn get_store(&self, doc_type: &str) -> Option<Arc<dyn DocumentStore>> {
        let inner = self.docs.get_store(doc_type)?;
        Some(Arc::new(CountingStore {
            inner,
            gets: Arc::clone(&self.gets),
        }))
    }
}

fn related_spec(value_expression: Value) -> Value {
    json!({
        "type": "related_doc",
        "related_doc_type": "CommCareCase",
        "doc_id_expression": prop("parent_id"),
        "value_expression": value_expression,
    })
}

fn case_lookup() -> InMemoryLookup {
    InMemoryLookup::new()
        .with_doc("CommCareCase", "related-id", json!({"related_property": "foo"}))
        .with_doc("CommCareCase", "my-id", json!({"parent_id": "related-id"}))
}

#[test]
fn test_related_doc_simple_lookup() {
    let factory = ExpressionFactory::new().with_lookup(Arc::new(case_lookup()));
    let expr = factory.from_spec(&related_spec(prop("related_property"))).unwrap();
    assert_eq!(expr.evaluate(&json!({"parent_id": "related-id"}), None), json!("foo"));
}

#[test]
fn test_related_doc_not_found() {
    let factory = ExpressionFactory::new().with_lookup(Arc::new(case_lookup()));
    let expr = factory.from_spec(&related_spec(prop("related_property"))).unwrap();
    assert_eq!(expr.evaluate(&json!({"parent_id": "some-missing-id"}), None), Value::Null);
    assert_eq!(expr.evaluate(&json!({}), None), Value::Null);
    assert_eq!(expr.evaluate(&json!({"parent_id": ["related-id"]}), None), Value::Null);
}

#[test]
fn test_related_doc_unknown_doc_type_and_default_factory() {
    let spec = json!({
        "type": "related_doc",
        "related_doc_type": "CommCareUser",
        "doc_id_expression": prop("parent_id"),
        "value_expression": prop("related_property"),
    });
    let factory = ExpressionFactory::new().with_lookup(Arc::new(case_lookup()));
    let doc = json!({"parent_id": "related-id"});
    assert_eq!(factory.from_spec(&spec).unwrap().evaluate(&doc, None), Value::Null);
    assert_eq!(build(related_spec(prop("related_property"))).evaluate(&doc, None), Value::Null);
}

#[test]
fn test_related_doc_requires_fields() {
    build_err(json!({
        "type": "related_doc",
        "doc_id_expression": prop("parent_id"),
        "value_expression": prop("x"),
    }));
    build_err(json!({
        "type": "related_doc",
        "related_doc_type": "CommCareCase",
        "value_expression": prop("x"),
    }));
}

#[test]
fn test_root_doc_inside_related_doc_sees_top_level() {
    let factory = ExpressionFactory::new().with_lookup(Arc::new(case_lookup()));
    let expr = factory
        .from_spec(&related_spec(json!({"type": "root_doc", "expression": prop("name")})))
        .unwrap();
    let doc = json!({"parent_id": "related-id", "name": "child"});
    let ctx = EvaluationContext::new(json!({"name": "top"}));
    assert_eq!(expr.evaluate(&doc, Some(&ctx)), json!("top"));
}

#[test]
fn test_chained_related_docs() {
    let factory = ExpressionFactory::new().with_lookup(Arc::new(case_lookup()));
    let expr = factory
        .from_spec(&json!({
            "type": "related_doc",
            "related_doc_type": "CommCareCase",
            "doc_id_expression": prop("case_id"),
            "value_expression": related_spec(prop("related_property")),
        }))
        .unwrap();
    assert_eq!(expr.evaluate(&json!({"case_id": "my-id"}), None), json!("foo"));
}

#[test]
fn test_related_doc_lookups_are_cached_per_context() {
    let lookup = Arc::new(CountingLookup {
        docs: case_lookup(),
        ..Default::default()
    });
    let gets = Arc::clone(&lookup.gets);
    let factory = ExpressionFactory::new().with_lookup(lookup);
    let expr = factory.from_spec(&related_spec(prop("related_property"))).unwrap();
    let doc = json!({"parent_id": "related-id"});

    let ctx = EvaluationContext::new(doc.clone());
    assert_eq!(expr.evaluate(&doc, Some(&ctx)), json!("foo"));
    assert_eq!(expr.evaluate(&doc, Some(&ctx)), json!("foo"));
    assert_eq!(gets.load(Ordering::SeqCst), 1);
    assert_eq!(ctx.cached_len(), 1);

    // A fresh context starts with an empty cache.
    let other = EvaluationContext::new(doc.clone());
    expr.evaluate(&doc, Some(&other));
    assert_eq!(gets.load(Ordering::SeqCst), 2);

    // No context, no cache.
    expr.evaluate(&doc, None);
    expr.evaluate(&doc, None);
    assert_eq!(gets.load(Ordering::SeqCst), 4);
}

#[test]
fn test_related_doc_cache_can_be_disabled() {
    let lookup = Arc::new(CountingLookup {
        docs: case_lookup(),
        ..Default::default()
    });
    let gets = Arc::clone(&lookup.gets);
    let factory = ExpressionFactory::new()
        .with_lookup(lookup)
        .with_config(FactoryConfig {
            cache_related_docs: false,
            ..Default::default()
        });
    let expr = factory.from_spec(&related_spec(prop("related_property"))).unwrap();
    let doc = json!({"parent_id": "related-id"});
    let ctx = EvaluationContext::new(doc.clone());
    expr.evaluate(&doc, Some(&ctx));
    expr.evaluate(&doc, Some(&ctx));
    assert_eq!(gets.load(Ordering::SeqCst), 2);
    assert_eq!(ctx.cached_len(), 0);
}

#[test]
fn test_untaken_branch_is_not_evaluated() {
    let lookup = Arc::new(CountingLookup {
        docs: case_lookup(),
        ..Default::default()
    });
    let gets = Arc::clone(&lookup.gets);
    let factory = ExpressionFactory::new().with_lookup(lookup);
    let expr = factory
        .from_spec(&json!({
            "type": "conditional",
            "test": {"type": "property_match", "property_name": "follow", "property_value": true},
            "expression_if_true": related_spec(prop("related_property")),
            "expression_if_false": {"type": "constant", "constant": "skipped"},
        }))
        .unwrap();

    let doc = json!({"parent_id": "related-id", "follow": false});
    assert_eq!(expr.evaluate(&doc, None), json!("skipped"));
    assert_eq!(gets.load(Ordering::SeqCst), 0);

    let doc = json!({"parent_id": "related-id", "follow": true});
    assert_eq!(expr.evaluate(&doc, None), json!("foo"));
    assert_eq!(gets.load(Ordering::SeqCst), 1);
}

// ----------------------------------------------------------------- Structure

#[test]
fn test_nested() {
    let expr = build(json!({
        "type": "nested",
        "argument_expression": prop("form"),
        "value_expression": {"type": "property_path", "property_path": ["meta", "user_id"]},
    }));
    let doc = json!({"form": {"meta": {"user_id": "u1"}}});
    assert_eq!(expr.evaluate(&doc, None), json!("u1"));
    assert_eq!(expr.evaluate(&json!({}), None), Value::Null);
}

#[test]
fn test_array_index() {
    let expr = build(json!({
        "type": "array_index",
        "array_expression": prop("items"),
        "index_expression": prop("i"),
    }));
    assert_eq!(expr.evaluate(&json!({"items": ["a", "b"], "i": 1}), None), json!("b"));
    assert_eq!(expr.evaluate(&json!({"items": ["a", "b"], "i": 2}), None), Value::Null);
    assert_eq!(expr.evaluate(&json!({"items": ["a", "b"], "i": -1}), None), Value::Null);
    assert_eq!(expr.evaluate(&json!({"items": "ab", "i": 0}), None), Value::Null);
    assert_eq!(expr.evaluate(&json!({"items": ["a"], "i": u64::MAX}), None), Value::Null);
}

#[test]
fn test_switch() {
    let expr = build(json!({
        "type": "switch",
        "switch_on": prop("status"),
        "cases": {
            "open": {"type": "constant", "constant": "O"},
            "1": {"type": "constant", "constant": "one"},
        },
        "default": {"type": "constant", "constant": "other"},
    }));
    assert_eq!(expr.evaluate(&json!({"status": "open"}), None), json!("O"));
    assert_eq!(expr.evaluate(&json!({"status": 1}), None), json!("one"));
    assert_eq!(expr.evaluate(&json!({"status": "closed"}), None), json!("other"));
    assert_eq!(expr.evaluate(&json!({}), None), json!("other"));
}

#[test]
fn test_switch_requires_cases_and_default() {
    build_err(json!({"type": "switch", "switch_on": prop("s"), "cases": {}, "default": prop("d")}));
    build_err(json!({"type": "switch", "switch_on": prop("s"), "cases": {"a": prop("a")}}));
}

#[test]
fn test_coalesce() {
    let expr = build(json!({
        "type": "coalesce",
        "expression": prop("name"),
        "default_expression": {"type": "constant", "constant": "unknown"},
    }));
    assert_eq!(expr.evaluate(&json!({"name": "ada"}), None), json!("ada"));
    assert_eq!(expr.evaluate(&json!({"name": ""}), None), json!("unknown"));
    assert_eq!(expr.evaluate(&json!({}), None), json!("unknown"));
    assert_eq!(expr.evaluate(&json!({"name": 0}), None), json!(0));
}

#[test]
fn test_dict() {
    let expr = build(json!({
        "type": "dict",
        "properties": {
            "name": prop("name"),
            "kind": {"type": "constant", "constant": "case"},
        },
    }));
    assert_eq!(
        expr.evaluate(&json!({"name": "ada"}), None),
        json!({"name": "ada", "kind": "case"})
    );
    build_err(json!({"type": "dict", "properties": {}}));
}

#[test]
fn test_iterator() {
    let expr = build(json!({
        "type": "iterator",
        "expressions": [prop("a"), prop("b"), prop("c")],
        "test": {
            "type": "not",
            "filter": {"type": "boolean_expression", "expression": {"type": "identity"}, "operator": "eq", "property_value": null},
        },
    }));
    assert_eq!(expr.evaluate(&json!({"a": 1, "c": 3}), None), json!([1, 3]));

    let unfiltered = build(json!({"type": "iterator", "expressions": [prop("a"), prop("b")]}));
    assert_eq!(unfiltered.evaluate(&json!({"a": 1}), None), json!([1, null]));
    build_err(json!({"type": "iterator", "expressions": []}));
}

// ----------------------------------------------------------------- Factory

#[test]
fn test_max_depth() {
    let factory = ExpressionFactory::new().with_config(FactoryConfig {
        max_depth: 3,
        ..Default::default()
    });
    let shallow = json!({"type": "nested", "argument_expression": prop("a"), "value_expression": prop("b")});
    assert!(factory.from_spec(&shallow).is_ok());

    let deep = json!({
        "type": "nested",
        "argument_expression": prop("a"),
        "value_expression": {"type": "root_doc", "expression": {"type": "root_doc", "expression": prop("b")}},
    });
    assert_eq!(
        factory.from_spec(&deep).err(),
        Some(BadSpecError::TooDeep { max_depth: 3 })
    );
}

#[test]
fn test_register_custom_expression() {
    use ucr_expression::{BuildCtx, ExpressionDefinition, Spec};

    #[derive(Debug)]
    struct Upper(ExpressionRef);

    impl Expression for Upper {
        fn evaluate(&self, doc: &Value, ctx: Option<&EvaluationContext>) -> Value {
            match self.0.evaluate(doc, ctx) {
                Value::String(s) => Value::String(s.to_uppercase()),
                _ => Value::Null,
            }
        }

        fn kind(&self) -> &'static str {
            "upper"
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    fn build_upper(spec: &Spec<'_>, ctx: &BuildCtx<'_>) -> Result<ExpressionRef, BadSpecError> {
        Ok(Arc::new(Upper(ctx.expression(spec.require("expression")?)?)))
    }

    let factory = ExpressionFactory::new().register_expression(ExpressionDefinition {
        name: "upper",
        aliases: &["uppercase"],
        build_fn: build_upper,
    });
    let expr = factory
        .from_spec(&json!({"type": "uppercase", "expression": prop("name")}))
        .unwrap();
    assert_eq!(expr.evaluate(&json!({"name": "ada"}), None), json!("ADA"));
    assert!(factory.from_spec(&json!({"type": "upper", "expression": prop("name")})).is_ok());
    assert!(from_spec(&json!({"type": "upper", "expression": prop("name")})).is_err());
}

#[test]
fn test_evaluation_is_repeatable_across_threads() {
    let expr = conditional();
    let doc = json!({"test": "match", "true_value": "correct"});
    let first = expr.evaluate(&doc, None);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let expr = Arc::clone(&expr);
            let doc = doc.clone();
            std::thread::spawn(move || expr.evaluate(&doc, None))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), first);
    }
}
