use thiserror::Error;

/// Raised while building an expression tree from a malformed specification.
///
/// Evaluation never produces this error: once a tree has been built it
/// degrades to `null` on sparse or missing data instead of failing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BadSpecError {
    #[error("spec must be an object, got {found}")]
    NotAnObject { found: &'static str },

    #[error("spec is missing a \"type\"")]
    MissingType,

    #[error("unknown {category} type: \"{type_name}\"")]
    UnknownType {
        category: &'static str,
        type_name: String,
    },

    #[error("{node_type} spec is missing required field \"{field}\"")]
    MissingField { node_type: String, field: String },

    #[error("{node_type} spec has an invalid \"{field}\": {reason}")]
    InvalidField {
        node_type: String,
        field: String,
        reason: String,
    },

    #[error("{node_type} spec has an unknown operator \"{operator}\"")]
    UnknownOperator { node_type: String, operator: String },

    #[error("spec nesting exceeds the maximum depth of {max_depth}")]
    TooDeep { max_depth: usize },
}

impl BadSpecError {
    pub fn missing(node_type: &str, field: &str) -> Self {
        BadSpecError::MissingField {
            node_type: node_type.to_string(),
            field: field.to_string(),
        }
    }

    pub fn invalid(node_type: &str, field: &str, reason: impl Into<String>) -> Self {
        BadSpecError::InvalidField {
            node_type: node_type.to_string(),
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by the `ucr-eval` command-line tool.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("invalid docs file: {0}")]
    InvalidDocs(String),

    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bad spec: {0}")]
    Spec(#[from] BadSpecError),
}
