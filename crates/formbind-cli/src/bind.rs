//! # Bind Subcommand
//!
//! Binds JSON input against a schema document with the built-in services.
//!
//! A single input must be a JSON object; the bound instance is printed as
//! pretty JSON. With `--many` the input must be a JSON array; items are
//! bound one at a time, each success is printed as one JSON line and each
//! failure, including an item that is not an object, is reported on stderr
//! with the item's index.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use formbind_bind::Binder;
use formbind_core::Record;
use formbind_schema::{ClassSchema, TypeCatalog};

use crate::services::builtin_registry;
use crate::{exit_code, load_schema, EXIT_CONFIGURATION, EXIT_OK};

/// Arguments for the `bind` subcommand.
#[derive(Args, Debug)]
pub struct BindArgs {
    /// Schema document (YAML or JSON).
    #[arg(long)]
    pub schema: PathBuf,

    /// JSON input file. Reads stdin when omitted.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Treat the input as a JSON array and bind every item.
    #[arg(long)]
    pub many: bool,
}

/// Execute the bind subcommand.
pub fn run_bind(args: &BindArgs) -> Result<u8> {
    let (schema, catalog) = load_schema(&args.schema)?;
    let text = read_input(args.input.as_deref())?;

    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    bind_text(
        &text,
        &schema,
        catalog,
        args.many,
        &mut stdout.lock(),
        &mut stderr.lock(),
    )
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input: {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read input from stdin")?;
            Ok(text)
        }
    }
}

/// Bind JSON `text` against `schema`, writing results to `out` and
/// per-input failures to `err`.
///
/// Returns the exit code of the worst failure.
///
/// # Errors
///
/// Malformed JSON, or input of the wrong shape.
pub fn bind_text(
    text: &str,
    schema: &ClassSchema,
    catalog: TypeCatalog,
    many: bool,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<u8> {
    let json: serde_json::Value = serde_json::from_str(text).context("input is not valid JSON")?;
    let binder = Binder::new(builtin_registry()).with_catalog(catalog);

    if !many {
        let input = to_record(json).context("input must be a JSON object")?;
        return match binder.bind_instance(&input, schema) {
            Ok(instance) => {
                writeln!(out, "{}", serde_json::to_string_pretty(&instance)?)?;
                Ok(EXIT_OK)
            }
            Err(error) => {
                writeln!(err, "{error}")?;
                Ok(exit_code(&error))
            }
        };
    }

    let items = match json {
        serde_json::Value::Array(items) => items,
        other => bail!("--many expects a JSON array, got {}", json_kind(&other)),
    };
    let count = items.len();

    let mut code = EXIT_OK;
    for (index, item) in items.into_iter().enumerate() {
        let input = match to_record(item) {
            Ok(input) => input,
            Err(error) => {
                writeln!(err, "item {index}: must be a JSON object, {error}")?;
                code = code.max(EXIT_CONFIGURATION);
                continue;
            }
        };
        match binder.bind_instance(&input, schema) {
            Ok(instance) => writeln!(out, "{}", serde_json::to_string(&instance)?)?,
            Err(error) => {
                writeln!(err, "item {index}: {error}")?;
                code = code.max(exit_code(&error));
            }
        }
    }
    tracing::info!(schema = schema.name(), items = count, code, "bound input array");
    Ok(code)
}

fn to_record(json: serde_json::Value) -> Result<Record> {
    Record::try_from(json).map_err(|other| anyhow::anyhow!("got {}", json_kind(&other)))
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
