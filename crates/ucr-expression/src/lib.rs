//! Expression engine for user-configurable reports.
//!
//! # Overview
//!
//! Report configurations describe how to pull values out of documents with
//! declarative JSON specs. Every spec is an object with a `type`
//! discriminator:
//!
//! ```json
//! {"type": "property_path", "property_path": ["form", "age"]}
//! ```
//!
//! [`ExpressionFactory`] validates a spec and builds an immutable tree of
//! [`Expression`] nodes. Malformed specs are rejected with [`BadSpecError`]
//! at build time; a built tree never fails at evaluation time and returns
//! `null` for missing data instead.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use ucr_expression::{from_spec, EvaluationContext, Expression};
//!
//! let expr = from_spec(&json!({
//!     "type": "root_doc",
//!     "expression": {"type": "property_name", "property_name": "owner_id"},
//! }))
//! .unwrap();
//!
//! let ctx = EvaluationContext::new(json!({"owner_id": "abc"}));
//! assert_eq!(expr.evaluate(&json!({}), Some(&ctx)), json!("abc"));
//! assert_eq!(expr.evaluate(&json!({}), None), json!(null));
//! ```

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod expressions;
pub mod factory;
pub mod filters;
pub mod lookup;
pub mod spec;
pub mod types;
pub mod util;

pub use config::FactoryConfig;
pub use context::EvaluationContext;
pub use error::{BadSpecError, CliError};
pub use factory::{BuildCtx, ExpressionFactory};
pub use lookup::{DocumentLookup, DocumentStore, InMemoryLookup, InMemoryStore, NoLookup};
pub use spec::Spec;
pub use types::{
    Expression, ExpressionDefinition, ExpressionRef, Filter, FilterDefinition, FilterRef,
};

use serde_json::Value;
use std::sync::OnceLock;

/// The shared factory with the built-in types and no document lookup.
pub fn default_factory() -> &'static ExpressionFactory {
    static FACTORY: OnceLock<ExpressionFactory> = OnceLock::new();
    FACTORY.get_or_init(ExpressionFactory::new)
}

/// Builds an expression with [`default_factory`].
pub fn from_spec(spec: &Value) -> Result<ExpressionRef, BadSpecError> {
    default_factory().from_spec(spec)
}

/// Builds a filter with [`default_factory`].
pub fn filter_from_spec(spec: &Value) -> Result<FilterRef, BadSpecError> {
    default_factory().filter_from_spec(spec)
}
