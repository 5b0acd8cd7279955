//! # Services Subcommand and Built-in Services
//!
//! The services every schema document run through the CLI can reference:
//!
//! | Name | Capability | Behaviour |
//! |---|---|---|
//! | `trim` | transformer | strips surrounding whitespace from strings |
//! | `lowercase` | transformer | lower-cases strings |
//! | `uppercase` | transformer | upper-cases strings |
//! | `non_empty` | validator | rejects `null`, `""` and empty arrays |
//! | `length` | validator | string or array length within named `min`/`max` |
//! | `one_of` | validator | value equals one of the positional arguments |
//! | `drop_empty` | pre-processor | removes keys whose value is `""` |
//! | `drop_null` | pre-processor | removes keys whose value is `null` |
//!
//! Transformers leave non-string values untouched.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use formbind_bind::{PreProcessor, Service, ServiceRegistry, Transformer, Validator};
use formbind_core::{Record, RuleError, Value};
use formbind_schema::Arguments;

/// A built-in validator rejected a value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct Rejected(pub String);

/// A built-in service was given arguments it cannot use.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("service {service}: {reason}")]
pub struct BadArguments {
    /// Service name.
    pub service: &'static str,
    /// What is wrong with the arguments.
    pub reason: String,
}

// ─── Transformers ────────────────────────────────────────────────────

/// String-to-string transformer.
struct StringMap(fn(&str) -> String);

impl Transformer for StringMap {
    fn transform(&self, value: Value, _args: &Arguments) -> Result<Value, RuleError> {
        Ok(match value {
            Value::String(s) => Value::String((self.0)(&s)),
            other => other,
        })
    }
}

impl Service for StringMap {
    fn as_transformer(&self) -> Option<&dyn Transformer> {
        Some(self)
    }
}

// ─── Validators ──────────────────────────────────────────────────────

/// Length of strings (in characters) and arrays.
fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::List(items) => Some(items.len()),
        Value::Map(record) => Some(record.len()),
        _ => None,
    }
}

struct NonEmpty;

impl Validator for NonEmpty {
    fn validate(&self, value: &Value, _args: &Arguments) -> Result<(), RuleError> {
        if value.is_null() || length_of(value) == Some(0) {
            return Err(Rejected("must not be empty".to_string()).into());
        }
        Ok(())
    }
}

impl Service for NonEmpty {
    fn as_validator(&self) -> Option<&dyn Validator> {
        Some(self)
    }
}

struct Length;

impl Length {
    fn bound(args: &Arguments, name: &str) -> Result<Option<usize>, BadArguments> {
        match args.named_value(name) {
            None => Ok(None),
            Some(value) => value
                .as_int()
                .and_then(|n| usize::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| BadArguments {
                    service: "length",
                    reason: format!("{name} must be a non-negative integer"),
                }),
        }
    }
}

impl Validator for Length {
    fn validate(&self, value: &Value, args: &Arguments) -> Result<(), RuleError> {
        let min = Self::bound(args, "min")?;
        let max = Self::bound(args, "max")?;
        let len = length_of(value)
            .ok_or_else(|| Rejected(format!("has no length ({})", value.type_name())))?;
        if let Some(min) = min.filter(|&min| len < min) {
            return Err(Rejected(format!("must be at least {min} long, got {len}")).into());
        }
        if let Some(max) = max.filter(|&max| len > max) {
            return Err(Rejected(format!("must be at most {max} long, got {len}")).into());
        }
        Ok(())
    }
}

impl Service for Length {
    fn as_validator(&self) -> Option<&dyn Validator> {
        Some(self)
    }
}

struct OneOf;

impl Validator for OneOf {
    fn validate(&self, value: &Value, args: &Arguments) -> Result<(), RuleError> {
        if args.positional_values().any(|allowed| allowed == value) {
            return Ok(());
        }
        let allowed: Vec<String> = args
            .positional_values()
            .map(|allowed| allowed.to_json().to_string())
            .collect();
        Err(Rejected(format!("must be one of: {}", allowed.join(", "))).into())
    }
}

impl Service for OneOf {
    fn as_validator(&self) -> Option<&dyn Validator> {
        Some(self)
    }
}

// ─── Pre-processors ──────────────────────────────────────────────────

/// Drops every key whose value matches the predicate.
struct DropWhere(fn(&Value) -> bool);

impl PreProcessor for DropWhere {
    fn process(&self, mut input: Record) -> Result<Record, RuleError> {
        input.retain(|_, value| !(self.0)(value));
        Ok(input)
    }
}

impl Service for DropWhere {
    fn as_pre_processor(&self) -> Option<&dyn PreProcessor> {
        Some(self)
    }
}

/// The registry of built-in services.
pub fn builtin_registry() -> ServiceRegistry {
    ServiceRegistry::new()
        .with("trim", StringMap(|s| s.trim().to_string()))
        .with("lowercase", StringMap(str::to_lowercase))
        .with("uppercase", StringMap(str::to_uppercase))
        .with("non_empty", NonEmpty)
        .with("length", Length)
        .with("one_of", OneOf)
        .with("drop_empty", DropWhere(|value| value.as_str() == Some("")))
        .with("drop_null", DropWhere(Value::is_null))
}

/// Arguments for the `services` subcommand.
#[derive(Args, Debug)]
pub struct ServicesArgs {}

/// List the built-in services with their capabilities.
pub fn run_services(_args: &ServicesArgs, out: &mut impl Write) -> Result<u8> {
    let registry = builtin_registry();
    for (name, capabilities) in registry.entries() {
        let capabilities: Vec<&str> = capabilities.iter().map(|c| c.as_str()).collect();
        writeln!(out, "{name:<12} {}", capabilities.join(", "))?;
    }
    Ok(crate::EXIT_OK)
}
