//! # formbind-cli: Command-Line Interface for formbind
//!
//! Provides the `formbind` binary: binds JSON input against a schema
//! document using a registry of built-in services.
//!
//! ## Subcommands
//!
//! - `formbind bind`: Bind one JSON object, or a JSON array of objects
//!   with `--many`, and print the bound instances as JSON.
//! - `formbind check`: Build a schema document and check its types and
//!   service references without binding anything.
//! - `formbind services`: List the built-in services.
//!
//! ```bash
//! formbind check --schema signup.yaml
//! formbind bind --schema signup.yaml --input signup.json
//! formbind bind --schema signup.yaml --many < signups.json
//! ```
//!
//! ## Exit Codes
//!
//! | Code | Meaning |
//! |---|---|
//! | 0 | every input bound |
//! | 1 | at least one input was rejected |
//! | 2 | configuration error: bad schema, unknown service, bad service arguments, unreadable input |
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers take parsed arguments
//!   and return an exit code.
//! - Handlers write to caller-supplied writers so they can be tested
//!   without capturing the process streams.

pub mod bind;
pub mod check;
pub mod services;

use std::path::Path;

use anyhow::{Context, Result};

use formbind_core::BindError;
use formbind_schema::{ClassSchema, SchemaDocument, TypeCatalog};

/// Every input bound.
pub const EXIT_OK: u8 = 0;
/// At least one input failed validation or was rejected by a rule.
pub const EXIT_REJECTED: u8 = 1;
/// The schema, a service reference or the input itself is unusable.
pub const EXIT_CONFIGURATION: u8 = 2;

/// Exit code for a failed bind.
///
/// A built-in service given unusable arguments is a schema problem, not a
/// rejected input.
pub fn exit_code(error: &BindError) -> u8 {
    match error {
        BindError::Rule(rule) if rule.downcast_ref::<services::BadArguments>().is_some() => {
            EXIT_CONFIGURATION
        }
        BindError::Validation(_) | BindError::Rule(_) => EXIT_REJECTED,
        BindError::Configuration(_) | BindError::Lookup(_) => EXIT_CONFIGURATION,
    }
}

/// Load a schema document and build its schema and type catalog.
pub fn load_schema(path: &Path) -> Result<(ClassSchema, TypeCatalog)> {
    let document = SchemaDocument::from_path(path)?;
    let parts = document
        .into_parts()
        .with_context(|| format!("invalid schema document: {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        schema = parts.0.name(),
        properties = parts.0.properties().len(),
        "loaded schema document"
    );
    Ok(parts)
}
