//! Transform and validation rules, inline and service-backed.

mod common;

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::{binder, record, schema};
use formbind_bind::{Binder, Service, ServiceRegistry, Transformer, Validator};
use formbind_core::{
    BindError, Capability, ConfigurationError, DeclaredType, LookupError, RuleError, Value,
};
use formbind_schema::{
    Arguments, Bindable, ClassSchema, InlineTransform, InlineValidate, Instance, PropertySchema,
    RuleAttribute, ServiceRef, TransformRule, ValidationRule,
};
use serde_json::json;

#[derive(Debug, PartialEq)]
struct RuleRejected(String);

impl fmt::Display for RuleRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rejected: {}", self.0)
    }
}

impl std::error::Error for RuleRejected {}

/// Upper-cases strings.
struct Shout;

impl Transformer for Shout {
    fn transform(&self, value: Value, _args: &Arguments) -> Result<Value, RuleError> {
        Ok(match value {
            Value::String(s) => Value::String(s.to_uppercase()),
            other => other,
        })
    }
}

impl Service for Shout {
    fn as_transformer(&self) -> Option<&dyn Transformer> {
        Some(self)
    }
}

/// Rejects strings longer than the `max` named argument.
struct MaxLength;

impl Validator for MaxLength {
    fn validate(&self, value: &Value, args: &Arguments) -> Result<(), RuleError> {
        let max = args.named_value("max").and_then(Value::as_int).unwrap_or(i64::MAX);
        let len = value.as_str().map_or(0, |s| s.chars().count() as i64);
        if len > max {
            return Err(RuleRejected(format!("longer than {max}")).into());
        }
        Ok(())
    }
}

impl Service for MaxLength {
    fn as_validator(&self) -> Option<&dyn Validator> {
        Some(self)
    }
}

/// Records every value it sees and accepts them all.
#[derive(Default)]
struct Counting(AtomicUsize);

impl Validator for Counting {
    fn validate(&self, _value: &Value, _args: &Arguments) -> Result<(), RuleError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Service for Counting {
    fn as_validator(&self) -> Option<&dyn Validator> {
        Some(self)
    }
}

fn registry() -> ServiceRegistry {
    ServiceRegistry::new()
        .with("shout", Shout)
        .with("max_length", MaxLength)
}

fn string(name: &str) -> formbind_schema::PropertyBuilder {
    PropertySchema::typed(name, DeclaredType::String)
}

#[test]
fn test_service_transform_feeds_validators() {
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let witness = Arc::clone(&seen);
    let schema = schema(
        string("name")
            .transform(TransformRule::service("shout"))
            .validate(ValidationRule::from_fn(move |value| {
                witness.lock().unwrap().push(value.clone());
                Ok(())
            })),
    );
    let instance = binder(registry())
        .bind_instance(&record(json!({"name": "ada"})), &schema)
        .unwrap();
    assert_eq!(instance.get("name"), Some(&Value::from("ADA")));
    assert_eq!(*seen.lock().unwrap(), vec![Value::from("ADA")]);
}

#[test]
fn test_transform_runs_before_coercion() {
    let schema = schema(
        PropertySchema::typed("n", DeclaredType::Int)
            .transform(TransformRule::from_fn(|value| {
                Ok(match value {
                    Value::String(s) => Value::String(s.replace(',', "")),
                    other => other,
                })
            })),
    );
    let instance = binder(registry())
        .bind_instance(&record(json!({"n": "1,024"})), &schema)
        .unwrap();
    assert_eq!(instance.get("n"), Some(&Value::Int(1024)));
}

#[test]
fn test_named_arguments_reach_the_service() {
    let rule = ValidationRule::service_with("max_length", Arguments::named([("max", 3)]));
    let schema = schema(string("code").validate(rule));
    let binder = binder(registry());

    assert!(binder
        .bind_instance(&record(json!({"code": "abc"})), &schema)
        .is_ok());

    let err = binder
        .bind_instance(&record(json!({"code": "abcd"})), &schema)
        .unwrap_err();
    assert_eq!(
        err.downcast_rule::<RuleRejected>(),
        Some(&RuleRejected("longer than 3".into()))
    );
    assert_eq!(err.to_string(), "rejected: longer than 3");
    assert!(!err.is_validation() && !err.is_configuration());
}

#[test]
fn test_first_failing_validator_stops_the_bind() {
    let counter = Arc::new(Counting::default());
    let mut registry = registry();
    registry.register_arc("count", Arc::clone(&counter) as Arc<dyn Service>);
    let schema = ClassSchema::builder("Form")
        .property(
            string("a")
                .validate(ValidationRule::service("count"))
                .validate(ValidationRule::from_fn(|_| Err(RuleRejected("a".into()).into())))
                .validate(ValidationRule::service("count")),
        )
        .property(string("b").validate(ValidationRule::service("count")))
        .build()
        .unwrap();

    let err = binder(registry)
        .bind_instance(&record(json!({"a": "x", "b": "y"})), &schema)
        .unwrap_err();
    assert_eq!(err.downcast_rule::<RuleRejected>(), Some(&RuleRejected("a".into())));
    assert_eq!(counter.0.load(Ordering::SeqCst), 1);
}

#[test]
fn test_inline_transform_error_passes_through() {
    let schema = schema(
        string("name").transform(TransformRule::from_fn(|_| Err(RuleRejected("t".into()).into()))),
    );
    let err = binder(registry())
        .bind_instance(&record(json!({"name": "x"})), &schema)
        .unwrap_err();
    assert!(matches!(err, BindError::Rule(_)));
    assert_eq!(err.downcast_rule::<RuleRejected>(), Some(&RuleRejected("t".into())));
}

#[test]
fn test_service_without_capability_is_a_configuration_error() {
    let transforming = schema(string("name").transform(TransformRule::service("max_length")));
    let err = binder(registry())
        .bind_instance(&record(json!({"name": "x"})), &transforming)
        .unwrap_err();
    assert_eq!(
        err.as_configuration(),
        Some(&ConfigurationError::MissingCapability {
            service: "max_length".into(),
            capability: Capability::Transformer,
        })
    );
    assert_eq!(err.to_string(), "Service max_length does not implement Transformer");

    let validating = schema(string("name").validate(ValidationRule::service("shout")));
    let err = binder(registry())
        .bind_instance(&record(json!({"name": "x"})), &validating)
        .unwrap_err();
    assert_eq!(err.to_string(), "Service shout does not implement Validator");
}

#[test]
fn test_unknown_service_is_a_lookup_error() {
    let schema = schema(string("name").validate(ValidationRule::service("nope")));
    let err = binder(registry())
        .bind_instance(&record(json!({"name": "x"})), &schema)
        .unwrap_err();
    assert!(matches!(err, BindError::Lookup(LookupError::NotFound { .. })));
    assert_eq!(err.to_string(), "Service nope not found");
}

#[test]
fn test_rules_are_skipped_for_absent_keys_with_defaults() {
    let schema = schema(
        string("name")
            .default("fallback")
            .validate(ValidationRule::service("nope")),
    );
    let instance = binder(registry())
        .bind_instance(&record(json!({})), &schema)
        .unwrap();
    assert_eq!(instance.get("name"), Some(&Value::from("fallback")));
}

#[test]
fn test_untyped_null_reaches_validators() {
    let schema = schema(
        PropertySchema::untyped("note")
            .validate(ValidationRule::from_fn(|value| {
                if value.is_null() {
                    Err("note must not be null".into())
                } else {
                    Ok(())
                }
            })),
    );
    let err = binder(registry())
        .bind_instance(&record(json!({"note": null})), &schema)
        .unwrap_err();
    assert_eq!(err.to_string(), "note must not be null");
}

// ─── attributes ─────────────────────────────────────────────────────

/// Trims strings inline.
#[derive(Debug)]
struct Trim;

impl InlineTransform for Trim {
    fn transform(&self, value: Value) -> Result<Value, RuleError> {
        Ok(match value {
            Value::String(s) => Value::String(s.trim().to_string()),
            other => other,
        })
    }
}

impl RuleAttribute for Trim {
    fn as_inline_transform(self: Arc<Self>) -> Option<Arc<dyn InlineTransform>> {
        Some(self)
    }
}

/// Validates inline that a string is non-empty and delegates shouting to
/// a service.
#[derive(Debug)]
struct NonEmptyShout;

impl InlineValidate for NonEmptyShout {
    fn validate(&self, value: &Value) -> Result<(), RuleError> {
        match value.as_str() {
            Some("") => Err("empty".into()),
            _ => Ok(()),
        }
    }
}

impl RuleAttribute for NonEmptyShout {
    fn as_inline_validator(self: Arc<Self>) -> Option<Arc<dyn InlineValidate>> {
        Some(self)
    }

    fn transformer_service(&self) -> Option<ServiceRef> {
        Some(ServiceRef::new("shout"))
    }
}

/// Claims both an inline and a service transform.
#[derive(Debug)]
struct Confused;

impl InlineTransform for Confused {
    fn transform(&self, value: Value) -> Result<Value, RuleError> {
        Ok(value)
    }
}

impl RuleAttribute for Confused {
    fn attribute_name(&self) -> &'static str {
        "Confused"
    }

    fn as_inline_transform(self: Arc<Self>) -> Option<Arc<dyn InlineTransform>> {
        Some(self)
    }

    fn transformer_service(&self) -> Option<ServiceRef> {
        Some(ServiceRef::new("shout"))
    }
}

#[test]
fn test_attribute_contributes_transform_and_validator() {
    let schema = schema(string("name").attribute(Arc::new(NonEmptyShout)));
    let binder = binder(registry());

    let instance = binder
        .bind_instance(&record(json!({"name": "ada"})), &schema)
        .unwrap();
    assert_eq!(instance.get("name"), Some(&Value::from("ADA")));

    let err = binder
        .bind_instance(&record(json!({"name": ""})), &schema)
        .unwrap_err();
    assert_eq!(err.to_string(), "empty");
}

#[test]
fn test_second_transform_from_attribute_is_rejected() {
    let err = string("name")
        .attribute(Arc::new(Trim))
        .attribute(Arc::new(NonEmptyShout))
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigurationError::MultipleTransforms { .. }));
}

struct Account {
    login: String,
}

impl Bindable for Account {
    fn schema() -> Result<ClassSchema, ConfigurationError> {
        ClassSchema::builder("Account")
            .property(string("login").attribute(Arc::new(Confused)))
            .build()
    }

    fn from_instance(mut instance: Instance) -> Result<Self, BindError> {
        Ok(Self {
            login: instance.take("login")?,
        })
    }
}

struct Trimmed {
    login: String,
}

impl Bindable for Trimmed {
    fn schema() -> Result<ClassSchema, ConfigurationError> {
        ClassSchema::builder("Trimmed")
            .property(string("login").attribute(Arc::new(Trim)))
            .build()
    }

    fn from_instance(mut instance: Instance) -> Result<Self, BindError> {
        Ok(Self {
            login: instance.take("login")?,
        })
    }
}

#[test]
fn test_ambiguous_attribute_surfaces_on_bind() {
    let binder = Binder::new(registry());
    let result = binder.bind::<Account>(&record(json!({"login": "ada"})));
    let err = match result {
        Ok(account) => panic!("bound {}", account.login),
        Err(err) => err,
    };
    assert!(matches!(
        err.as_configuration(),
        Some(ConfigurationError::AmbiguousRule { attribute, .. }) if attribute == "Confused"
    ));
    assert!(!binder.cache().contains::<Account>());
}

#[test]
fn test_inline_attribute_on_typed_target() {
    let binder = Binder::new(registry());
    let trimmed: Trimmed = binder.bind(&record(json!({"login": "  ada "}))).unwrap();
    assert_eq!(trimmed.login, "ada");
}
