//! Binding into Rust types through `Bindable`.

mod common;

use std::sync::Arc;
use std::thread;

use common::{catalog, record};
use formbind_bind::{Binder, ServiceRegistry};
use formbind_core::{BindError, ConfigurationError, DeclaredType, EnumCase, Record, Value};
use formbind_schema::{
    Bindable, ClassSchema, Instance, PropertySchema, SchemaCache, TransformRule, ValidationRule,
};
use serde_json::json;

#[derive(Debug)]
struct Signup {
    login: String,
    age: i64,
    plan: EnumCase,
    suit: Option<EnumCase>,
    newsletter: bool,
}

impl Bindable for Signup {
    fn schema() -> Result<ClassSchema, ConfigurationError> {
        ClassSchema::builder("Signup")
            .property(
                PropertySchema::typed("login", DeclaredType::String)
                    .key("user")
                    .validate(ValidationRule::from_fn(|value| match value.as_str() {
                        Some(login) if login.len() >= 3 => Ok(()),
                        _ => Err("login too short".into()),
                    })),
            )
            .property(PropertySchema::typed("age", DeclaredType::Int))
            .property(
                PropertySchema::typed("plan", DeclaredType::Enum("Plan".into()))
                    .use_backing_value()
                    .default(common::enum_case("Plan", "Free")),
            )
            .property(PropertySchema::typed("suit", DeclaredType::Enum("Suit".into())).nullable())
            .property(
                PropertySchema::typed("newsletter", DeclaredType::Bool)
                    .key("subscribe")
                    .key_only(),
            )
            .build()
    }

    fn from_instance(mut instance: Instance) -> Result<Self, BindError> {
        Ok(Self {
            login: instance.take("login")?,
            age: instance.take("age")?,
            plan: instance.take("plan")?,
            suit: instance.take("suit")?,
            newsletter: instance.take("newsletter")?,
        })
    }
}

/// Declares an `int` property but reads it as a string.
#[derive(Debug)]
struct Mismatched {
    #[allow(dead_code)]
    n: String,
}

impl Bindable for Mismatched {
    fn schema() -> Result<ClassSchema, ConfigurationError> {
        ClassSchema::builder("Mismatched")
            .property(PropertySchema::typed("n", DeclaredType::Int))
            .build()
    }

    fn from_instance(mut instance: Instance) -> Result<Self, BindError> {
        Ok(Self {
            n: instance.take("n")?,
        })
    }
}

fn binder() -> Binder {
    Binder::new(ServiceRegistry::new()).with_catalog(catalog())
}

#[test]
fn test_bind_full_target() {
    let input = record(json!({
        "user": "ada",
        "age": "36",
        "plan": "pro",
        "suit": null,
        "subscribe": "",
    }));
    let signup: Signup = binder().bind(&input).unwrap();
    assert_eq!(signup.login, "ada");
    assert_eq!(signup.age, 36);
    assert_eq!(signup.plan.name(), "Pro");
    assert!(signup.suit.is_none());
    assert!(signup.newsletter);
}

#[test]
fn test_bind_uses_defaults_and_presence() {
    let input = record(json!({"user": "grace", "age": 85, "suit": "Hearts"}));
    let signup: Signup = binder().bind(&input).unwrap();
    assert_eq!(signup.plan.name(), "Free");
    assert_eq!(signup.suit.map(|case| case.name().to_string()), Some("Hearts".into()));
    assert!(!signup.newsletter);
}

#[test]
fn test_binding_twice_yields_equal_instances() {
    let schema = ClassSchema::builder("Profile")
        .property(
            PropertySchema::typed("name", DeclaredType::String).transform(TransformRule::from_fn(
                |value| Ok(value.as_str().map_or(value.clone(), |s| Value::from(s.trim()))),
            )),
        )
        .property(
            PropertySchema::typed("plan", DeclaredType::Enum("Plan".into()))
                .use_backing_value()
                .default(common::enum_case("Plan", "Free")),
        )
        .property(PropertySchema::typed("suit", DeclaredType::Enum("Suit".into())))
        .property(
            PropertySchema::typed("newsletter", DeclaredType::Bool)
                .key("subscribe")
                .key_only(),
        )
        .build()
        .unwrap();
    let binder = binder();

    for input in [
        record(json!({"name": " ada ", "suit": "Hearts", "subscribe": null})),
        record(json!({"name": "bob", "plan": "pro", "suit": "Spades"})),
    ] {
        let first = binder.bind_instance(&input, &schema).unwrap();
        let second = binder.bind_instance(&input, &schema).unwrap();
        assert_eq!(first, second);
    }

    let input = record(json!({"name": "ada", "suit": "hearts"}));
    let first = binder.bind_instance(&input, &schema).unwrap_err();
    let second = binder.bind_instance(&input, &schema).unwrap_err();
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn test_bind_reports_the_first_failure() {
    let err = binder()
        .bind::<Signup>(&record(json!({"user": "al", "age": 1, "suit": null})))
        .unwrap_err();
    assert_eq!(err.to_string(), "login too short");

    let err = binder()
        .bind::<Signup>(&record(json!({"user": "ada", "age": 1, "suit": null, "admin": true})))
        .unwrap_err();
    assert_eq!(err.to_string(), "Input data contains extra keys: admin");
}

#[test]
fn test_field_mismatch_is_a_configuration_error() {
    let err = binder()
        .bind::<Mismatched>(&record(json!({"n": 3})))
        .unwrap_err();
    assert_eq!(
        err.as_configuration(),
        Some(&ConfigurationError::FieldMismatch {
            class: "Mismatched".into(),
            property: "n".into(),
            expected: "string".into(),
            actual: "int".into(),
        })
    );
}

#[test]
fn test_bind_many_yields_one_result_per_input() {
    let inputs = vec![
        record(json!({"user": "ada", "age": 1, "suit": null})),
        record(json!({"user": "bob", "age": "x", "suit": null})),
        record(json!({"user": "cy", "age": 3, "suit": null})),
        record(json!({"user": "dee", "age": 4, "suit": "Spades"})),
    ];
    let binder = binder();
    let results: Vec<Result<Signup, BindError>> = binder.bind_many(&inputs).collect();
    assert_eq!(results.len(), 4);
    assert!(results[0].is_ok());
    assert!(results[1].as_ref().unwrap_err().is_validation());
    assert_eq!(results[2].as_ref().unwrap_err().to_string(), "login too short");
    assert_eq!(results[3].as_ref().unwrap().age, 4);
    assert_eq!(binder.cache().len(), 1);
}

#[test]
fn test_bind_many_instances_with_runtime_schema() {
    let schema = ClassSchema::builder("Row")
        .property(PropertySchema::typed("id", DeclaredType::Int))
        .build()
        .unwrap();
    let inputs: Vec<Record> = (0..3).map(|i| record(json!({ "id": i.to_string() }))).collect();
    let ids: Vec<i64> = binder()
        .bind_many_instances(inputs, &schema)
        .map(|result| result.unwrap().get("id").and_then(|v| v.as_int()).unwrap())
        .collect();
    assert_eq!(ids, [0, 1, 2]);
}

#[test]
fn test_binder_is_shared_across_threads() {
    let cache = Arc::new(SchemaCache::new());
    let binder = binder().with_cache(Arc::clone(&cache));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let binder = binder.clone();
            thread::spawn(move || {
                let input = record(json!({"user": format!("user{i}"), "age": i, "suit": null}));
                binder.bind::<Signup>(&input).map(|signup| signup.age)
            })
        })
        .collect();

    let mut ages: Vec<i64> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap().unwrap())
        .collect();
    ages.sort_unstable();
    assert_eq!(ages, (0..8).collect::<Vec<i64>>());
    assert_eq!(cache.len(), 1);
    assert!(cache.contains::<Signup>());
}
