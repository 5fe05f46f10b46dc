//! Read-only access to a raw spec object.
//!
//! Every accessor separates "key absent" from "key present with a `null`
//! value"; the `constant` expression depends on that distinction.

use crate::error::BadSpecError;
use crate::util;
use serde_json::{Map, Value};

/// A spec object whose `type` discriminator has already been read.
#[derive(Debug, Clone, Copy)]
pub struct Spec<'a> {
    kind: &'a str,
    fields: &'a Map<String, Value>,
}

impl<'a> Spec<'a> {
    /// Checks that `value` is an object with a string `type` field.
    pub fn parse(value: &'a Value) -> Result<Self, BadSpecError> {
        let fields = value.as_object().ok_or(BadSpecError::NotAnObject {
            found: util::type_name(value),
        })?;
        let kind = match fields.get("type") {
            None | Some(Value::Null) => return Err(BadSpecError::MissingType),
            Some(Value::String(s)) => s.as_str(),
            Some(other) => {
                return Err(BadSpecError::invalid(
                    "spec",
                    "type",
                    format!("expected a string, got {}", util::type_name(other)),
                ))
            }
        };
        Ok(Spec { kind, fields })
    }

    /// The `type` discriminator.
    pub fn kind(&self) -> &'a str {
        self.kind
    }

    /// True when `field` is present, even if its value is `null`.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns the field if present and not `null`.
    pub fn optional(&self, field: &str) -> Option<&'a Value> {
        match self.fields.get(field) {
            None | Some(Value::Null) => None,
            Some(v) => Some(v),
        }
    }

    /// Returns the field if present; an explicit `null` is a valid value.
    pub fn require_present(&self, field: &str) -> Result<&'a Value, BadSpecError> {
        self.fields
            .get(field)
            .ok_or_else(|| BadSpecError::missing(self.kind, field))
    }

    /// Returns the field if present and not `null`.
    pub fn require(&self, field: &str) -> Result<&'a Value, BadSpecError> {
        self.optional(field)
            .ok_or_else(|| BadSpecError::missing(self.kind, field))
    }

    /// Returns a required, non-empty string field.
    pub fn require_str(&self, field: &str) -> Result<&'a str, BadSpecError> {
        match self.require(field)? {
            Value::String(s) if !s.is_empty() => Ok(s.as_str()),
            Value::String(_) => Err(self.invalid(field, "must not be empty")),
            other => Err(self.invalid(
                field,
                format!("expected a string, got {}", util::type_name(other)),
            )),
        }
    }

    /// Returns a required, non-empty list of path segments.
    pub fn require_path(&self, field: &str) -> Result<Vec<String>, BadSpecError> {
        let items = match self.require(field)? {
            Value::Array(items) => items,
            other => {
                return Err(self.invalid(
                    field,
                    format!("expected a list of strings, got {}", util::type_name(other)),
                ))
            }
        };
        if items.is_empty() {
            return Err(self.invalid(field, "must not be empty"));
        }
        items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(self.invalid(
                    field,
                    format!("path segments must be strings, got {}", util::type_name(other)),
                )),
            })
            .collect()
    }

    /// Returns a required, non-empty array field.
    pub fn require_array(&self, field: &str) -> Result<&'a Vec<Value>, BadSpecError> {
        match self.require(field)? {
            Value::Array(items) if !items.is_empty() => Ok(items),
            Value::Array(_) => Err(self.invalid(field, "must not be empty")),
            other => Err(self.invalid(
                field,
                format!("expected a list, got {}", util::type_name(other)),
            )),
        }
    }

    /// Returns a required, non-empty object field.
    pub fn require_object(&self, field: &str) -> Result<&'a Map<String, Value>, BadSpecError> {
        match self.require(field)? {
            Value::Object(map) if !map.is_empty() => Ok(map),
            Value::Object(_) => Err(self.invalid(field, "must not be empty")),
            other => Err(self.invalid(
                field,
                format!("expected an object, got {}", util::type_name(other)),
            )),
        }
    }

    pub fn invalid(&self, field: &str, reason: impl Into<String>) -> BadSpecError {
        BadSpecError::invalid(self.kind, field, reason)
    }
}
