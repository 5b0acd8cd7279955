//! # Check Subcommand
//!
//! Builds a schema document without binding anything and reports what a
//! bind would fail on before it sees any input: declared types the binder
//! cannot coerce, and service references that are unknown or lack the
//! capability they are used for.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use formbind_bind::{Coercion, ServiceLocator, ServiceRegistry};
use formbind_core::{Capability, ConfigurationError, LookupError};
use formbind_schema::{ClassSchema, PropertySchema, TransformRule, TypeCatalog, ValidationRule};

use crate::services::builtin_registry;
use crate::{load_schema, EXIT_CONFIGURATION, EXIT_OK};

/// Arguments for the `check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Schema document (YAML or JSON).
    #[arg(long)]
    pub schema: PathBuf,
}

/// Execute the check subcommand.
pub fn run_check(args: &CheckArgs) -> Result<u8> {
    let (schema, catalog) = load_schema(&args.schema)?;
    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    report(
        &schema,
        &catalog,
        &builtin_registry(),
        &mut stdout.lock(),
        &mut stderr.lock(),
    )
}

/// Describe `schema` on `out` and its problems on `err`.
pub fn report(
    schema: &ClassSchema,
    catalog: &TypeCatalog,
    registry: &ServiceRegistry,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<u8> {
    writeln!(out, "{}", schema.name())?;
    for property in schema.properties() {
        writeln!(out, "  {}", describe(property))?;
    }

    let problems = problems(schema, catalog, registry);
    for problem in &problems {
        writeln!(err, "{problem}")?;
    }
    Ok(if problems.is_empty() {
        EXIT_OK
    } else {
        EXIT_CONFIGURATION
    })
}

/// One line per property: name, effective key, declared type and flags.
pub fn describe(property: &PropertySchema) -> String {
    let mut ty = match property.declared_type() {
        Some(declared) => declared.to_string(),
        None => "untyped".to_string(),
    };
    if property.is_nullable() {
        ty.insert(0, '?');
    }
    let mut line = format!("{:<16} key={:<16} type={ty}", property.name(), property.key());
    for (flag, set) in [
        ("key-only", property.is_key_only()),
        ("backing-value", property.use_backing_value()),
        ("default", property.default().is_some()),
    ] {
        if set {
            line.push(' ');
            line.push_str(flag);
        }
    }
    line
}

/// Everything a bind against `schema` would reject regardless of input.
pub fn problems(
    schema: &ClassSchema,
    catalog: &TypeCatalog,
    registry: &ServiceRegistry,
) -> Vec<String> {
    let mut found = Vec::new();
    let mut need = |name: &str, capability: Capability| {
        if let Err(problem) = require(registry, name, capability) {
            found.push(problem);
        }
    };

    for name in schema.pre_processors() {
        need(name, Capability::PreProcessor);
    }
    for property in schema.properties() {
        if let Some(TransformRule::Service(service)) = property.transform() {
            need(service.name(), Capability::Transformer);
        }
        for rule in property.validators() {
            if let ValidationRule::Service(service) = rule {
                need(service.name(), Capability::Validator);
            }
        }
    }

    for property in schema.properties() {
        if let Err(problem) = Coercion::for_property(property, catalog) {
            found.push(problem.to_string());
        }
    }
    found
}

fn require(registry: &ServiceRegistry, name: &str, capability: Capability) -> Result<(), String> {
    let service = registry
        .resolve(name)
        .map_err(|e: LookupError| e.to_string())?;
    let present = match capability {
        Capability::PreProcessor => service.as_pre_processor().is_some(),
        Capability::Transformer => service.as_transformer().is_some(),
        Capability::Validator => service.as_validator().is_some(),
    };
    if present {
        Ok(())
    } else {
        Err(ConfigurationError::MissingCapability {
            service: name.to_string(),
            capability,
        }
        .to_string())
    }
}
