//! `ucr-eval`: evaluate a report expression spec against a document.
//!
//! Run `ucr-eval --help` for the options. The document is read from stdin.
//! Set `RUST_LOG=debug` to trace lookups.

use clap::Parser;
use std::io::{self, Read, Write};
use tracing_subscriber::EnvFilter;
use ucr_expression::cli::{evaluate, EvalArgs, EvalInput};
use ucr_expression::CliError;

fn run(args: &EvalArgs) -> Result<String, CliError> {
    let mut document = String::new();
    io::stdin()
        .read_to_string(&mut document)
        .map_err(|source| CliError::Io {
            path: "<stdin>".into(),
            source,
        })?;
    let input = EvalInput::load(args, document)?;
    evaluate(&input)
}

fn main() {
    let args = EvalArgs::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    match run(&args) {
        Ok(result) => {
            let mut stdout = io::stdout();
            if let Err(e) = writeln!(stdout, "{result}") {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
