//! Logic behind the `ucr-eval` binary.
//!
//! ```text
//! ucr-eval <spec.json> [--root <root.json>] [--docs <docs.json>] [--config <config.json>]
//! ```
//!
//! The document is read from stdin and the result is printed as JSON.

use crate::config::FactoryConfig;
use crate::context::EvaluationContext;
use crate::error::CliError;
use crate::factory::ExpressionFactory;
use crate::lookup::InMemoryLookup;
use clap::Parser;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Command-line arguments of `ucr-eval`.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    name = "ucr-eval",
    version,
    about = "Evaluate a report expression spec against a JSON document read from stdin"
)]
pub struct EvalArgs {
    /// Expression spec file
    pub spec: PathBuf,

    /// Root document for `root_doc` (defaults to the input document)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Related documents as {"<doc_type>": {"<id>": <doc>}}
    #[arg(long)]
    pub docs: Option<PathBuf>,

    /// Factory settings file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// File contents gathered for one evaluation.
#[derive(Debug, Clone, Default)]
pub struct EvalInput {
    pub spec: String,
    pub document: String,
    pub root: Option<String>,
    pub docs: Option<String>,
    pub config: Option<String>,
}

impl EvalInput {
    /// Reads the files named in `args`; the document comes from `document`.
    pub fn load(args: &EvalArgs, document: String) -> Result<Self, CliError> {
        Ok(EvalInput {
            spec: read(&args.spec)?,
            document,
            root: args.root.as_deref().map(read).transpose()?,
            docs: args.docs.as_deref().map(read).transpose()?,
            config: args.config.as_deref().map(read).transpose()?,
        })
    }
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Builds the spec and evaluates it against the document.
///
/// Without a root document the input document is used as the root, the way a
/// report evaluates each source document at the top level.
pub fn evaluate(input: &EvalInput) -> Result<String, CliError> {
    let config = match &input.config {
        Some(json) => FactoryConfig::from_json_str(json)?,
        None => FactoryConfig::default(),
    };
    let lookup = match &input.docs {
        Some(json) => InMemoryLookup::from_json(&serde_json::from_str::<Value>(json)?).ok_or_else(|| {
            CliError::InvalidDocs("expected doc types mapping ids to documents".into())
        })?,
        None => InMemoryLookup::new(),
    };
    let factory = ExpressionFactory::new()
        .with_config(config)
        .with_lookup(Arc::new(lookup));

    let spec: Value = serde_json::from_str(&input.spec)?;
    let expression = factory.from_spec(&spec)?;

    let document: Value = serde_json::from_str(input.document.trim())?;
    let root = match &input.root {
        Some(json) => serde_json::from_str(json)?,
        None => document.clone(),
    };
    let ctx = EvaluationContext::new(root);
    let result = expression.evaluate(&document, Some(&ctx));
    debug!(kind = expression.kind(), lookups = ctx.cached_len(), "evaluated");
    Ok(serde_json::to_string_pretty(&result)?)
}
