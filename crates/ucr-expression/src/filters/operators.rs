//! Comparison operators of `boolean_expression` filters.
//!
//! Comparisons are strict: values of different JSON types never match, and
//! `null` only equals `null`.

use crate::error::BadSpecError;
use crate::spec::Spec;
use crate::util;
use serde_json::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    NotEq,
    In,
    InMulti,
    AnyInMulti,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl Operator {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "eq" => Operator::Eq,
            "not_eq" => Operator::NotEq,
            "in" => Operator::In,
            "in_multi" => Operator::InMulti,
            "any_in_multi" => Operator::AnyInMulti,
            "lt" => Operator::Lt,
            "lte" => Operator::Lte,
            "gt" => Operator::Gt,
            "gte" => Operator::Gte,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::NotEq => "not_eq",
            Operator::In => "in",
            Operator::InMulti => "in_multi",
            Operator::AnyInMulti => "any_in_multi",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
        }
    }

    /// Reads `operator` from a spec and checks that `property_value` fits it.
    pub fn from_spec(spec: &Spec<'_>, property_value: &Value) -> Result<Self, BadSpecError> {
        let name = spec.require_str("operator")?;
        let operator = Operator::from_name(name).ok_or_else(|| BadSpecError::UnknownOperator {
            node_type: spec.kind().to_string(),
            operator: name.to_string(),
        })?;
        match operator {
            Operator::In | Operator::AnyInMulti if !property_value.is_array() => Err(spec.invalid(
                "property_value",
                format!(
                    "operator \"{}\" needs a list, got {}",
                    operator.as_str(),
                    util::type_name(property_value)
                ),
            )),
            _ => Ok(operator),
        }
    }

    /// Applies the operator to an evaluated value and the spec's literal.
    pub fn apply(&self, left: &Value, right: &Value) -> bool {
        match self {
            Operator::Eq => util::json_eq(left, right),
            Operator::NotEq => !util::json_eq(left, right),
            Operator::In => right
                .as_array()
                .is_some_and(|items| items.iter().any(|item| util::json_eq(left, item))),
            Operator::InMulti => util::multi_contains(left, right),
            Operator::AnyInMulti => right
                .as_array()
                .is_some_and(|items| items.iter().any(|item| util::multi_contains(left, item))),
            Operator::Lt => util::compare(left, right) == Some(Ordering::Less),
            Operator::Lte => matches!(
                util::compare(left, right),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Operator::Gt => util::compare(left, right) == Some(Ordering::Greater),
            Operator::Gte => matches!(
                util::compare(left, right),
                Some(Ordering::Greater | Ordering::Equal)
            ),
        }
    }
}
