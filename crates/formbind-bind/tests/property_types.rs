//! Declared-type coercion through the full bind pipeline.

mod common;

use common::{bind_foo, object, Other, Text, Upload};
use formbind_core::{BindError, ConfigurationError, DeclaredType, Record, ValidationFailure, Value};
use formbind_schema::{PropertySchema, ValidationRule};

fn typed(declared: DeclaredType) -> formbind_schema::PropertyBuilder {
    PropertySchema::typed("foo", declared)
}

fn named(name: &str) -> formbind_schema::PropertyBuilder {
    typed(DeclaredType::Named(name.to_string()))
}

fn type_failure(err: &BindError) -> (&str, &str) {
    match err.as_validation() {
        Some(ValidationFailure::InvalidType { expected, actual, .. }) => (expected, actual),
        other => panic!("expected a type failure, got {other:?}"),
    }
}

// ─── bool ───────────────────────────────────────────────────────────

#[test]
fn test_bool_accepts_only_booleans() {
    assert_eq!(bind_foo(typed(DeclaredType::Bool), Value::Bool(true)).unwrap(), Value::Bool(true));
    assert_eq!(bind_foo(typed(DeclaredType::Bool), Value::Bool(false)).unwrap(), Value::Bool(false));

    for value in [Value::from(1), Value::from("true"), Value::from(0.0), Value::List(vec![])] {
        let actual = value.type_name();
        let err = bind_foo(typed(DeclaredType::Bool), value).unwrap_err();
        assert_eq!(type_failure(&err), ("bool", actual));
    }
}

// ─── string ─────────────────────────────────────────────────────────

#[test]
fn test_string_accepts_scalars_and_stringables() {
    let cases = [
        (Value::from("bar"), "bar"),
        (Value::from(12), "12"),
        (Value::from(-3), "-3"),
        (Value::from(1.5), "1.5"),
        (object(Text("from object")), "from object"),
    ];
    for (input, expected) in cases {
        assert_eq!(
            bind_foo(typed(DeclaredType::String), input).unwrap(),
            Value::from(expected)
        );
    }
}

#[test]
fn test_string_rejects_bool_containers_and_plain_objects() {
    for value in [
        Value::Bool(true),
        Value::List(vec![Value::from("a")]),
        Value::Map(Record::new()),
        object(Other),
    ] {
        let err = bind_foo(typed(DeclaredType::String), value).unwrap_err();
        assert_eq!(type_failure(&err).0, "string|int|float|Stringable");
    }
}

// ─── int ────────────────────────────────────────────────────────────

#[test]
fn test_int_accepts_ints_and_strict_int_strings() {
    let cases = [
        (Value::from(5), 5),
        (Value::from("123"), 123),
        (Value::from("+123"), 123),
        (Value::from("-123"), -123),
        (Value::from("007"), 7),
        (object(Text("64")), 64),
    ];
    for (input, expected) in cases {
        assert_eq!(
            bind_foo(typed(DeclaredType::Int), input).unwrap(),
            Value::Int(expected)
        );
    }
}

#[test]
fn test_int_rejects_loose_numeric_strings() {
    for text in ["1.0", "1e3", "0x1A", " 12", "12 ", "12a", "", "+", "99999999999999999999"] {
        let err = bind_foo(typed(DeclaredType::Int), Value::from(text)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Value for $foo has invalid type, expected int or parseable string, got string",
            "input {text:?}"
        );
    }
}

#[test]
fn test_int_rejects_floats_and_bools() {
    let err = bind_foo(typed(DeclaredType::Int), Value::from(1.0)).unwrap_err();
    assert_eq!(type_failure(&err), ("int or parseable string", "float"));
    let err = bind_foo(typed(DeclaredType::Int), Value::Bool(true)).unwrap_err();
    assert_eq!(type_failure(&err), ("int or parseable string", "bool"));
}

// ─── array ──────────────────────────────────────────────────────────

#[test]
fn test_array_accepts_lists_and_maps_unchanged() {
    let list = Value::List(vec![Value::from(1), Value::from("a")]);
    assert_eq!(bind_foo(typed(DeclaredType::Array), list.clone()).unwrap(), list);

    let map: Record = [("a", 1)].into_iter().collect();
    assert_eq!(
        bind_foo(typed(DeclaredType::Array), Value::Map(map.clone())).unwrap(),
        Value::Map(map)
    );

    let err = bind_foo(typed(DeclaredType::Array), Value::from("a,b")).unwrap_err();
    assert_eq!(type_failure(&err), ("array", "string"));
}

// ─── dynamic ────────────────────────────────────────────────────────

#[test]
fn test_mixed_and_untyped_pass_anything() {
    for value in [
        Value::Null,
        Value::from(1.25),
        Value::from("x"),
        object(Other),
        Value::List(vec![]),
    ] {
        assert_eq!(bind_foo(typed(DeclaredType::Any), value.clone()).unwrap(), value);
        assert_eq!(bind_foo(PropertySchema::untyped("foo"), value.clone()).unwrap(), value);
    }
}

// ─── classes and interfaces ─────────────────────────────────────────

#[test]
fn test_class_types_accept_instances_and_subtypes() {
    let upload = object(Upload);
    for type_name in ["Upload", "File", "Named"] {
        let bound = bind_foo(named(type_name), upload.clone()).unwrap();
        assert_eq!(bound, upload, "declared {type_name}");
    }
}

#[test]
fn test_class_types_reject_other_values() {
    let err = bind_foo(named("File"), object(Other)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Value for $foo has invalid type, expected File, got object"
    );

    let err = bind_foo(named("Upload"), Value::from("upload.txt")).unwrap_err();
    assert_eq!(type_failure(&err), ("Upload", "string"));
}

// ─── unsupported declarations ───────────────────────────────────────

#[test]
fn test_float_and_iterable_are_not_implemented() {
    for declared in [DeclaredType::Float, DeclaredType::Iterable] {
        let err = bind_foo(typed(declared), Value::from(1)).unwrap_err();
        assert!(matches!(
            err.as_configuration(),
            Some(ConfigurationError::NotImplemented { .. })
        ));
    }
}

#[test]
fn test_nullable_float_still_fails_for_null() {
    let err = bind_foo(typed(DeclaredType::Float).nullable(), Value::Null).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_union_and_intersection_are_unsupported() {
    let union = DeclaredType::Union(vec![DeclaredType::Int, DeclaredType::String]);
    let intersection = DeclaredType::Intersection(vec![
        DeclaredType::Named("File".into()),
        DeclaredType::Named("Named".into()),
    ]);
    for declared in [union, intersection] {
        let err = bind_foo(typed(declared), Value::from(1)).unwrap_err();
        assert!(matches!(
            err.as_configuration(),
            Some(ConfigurationError::UnsupportedType { .. })
        ));
    }
}

#[test]
fn test_unknown_names_are_unresolvable() {
    for type_name in ["object", "self", "parent", "Missing"] {
        let err = bind_foo(named(type_name), object(Upload)).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Cannot handle properties of type {type_name} (property foo)")
        );
    }
}

// ─── null handling ──────────────────────────────────────────────────

#[test]
fn test_nullable_short_circuits_coercion_and_validation() {
    let property = typed(DeclaredType::Int)
        .nullable()
        .validate(ValidationRule::from_fn(|_: &Value| Err("must not run".into())));
    assert_eq!(bind_foo(property, Value::Null).unwrap(), Value::Null);
}

#[test]
fn test_null_for_non_nullable_is_a_type_failure_before_validators() {
    let property = typed(DeclaredType::String)
        .validate(ValidationRule::from_fn(|_: &Value| Err("must not run".into())));
    let err = bind_foo(property, Value::Null).unwrap_err();
    assert_eq!(type_failure(&err), ("string|int|float|Stringable", "null"));
}

#[test]
fn test_nullable_still_checks_non_null_values() {
    let err = bind_foo(typed(DeclaredType::Int).nullable(), Value::from("abc")).unwrap_err();
    assert!(err.is_validation());
    assert_eq!(
        bind_foo(typed(DeclaredType::Int).nullable(), Value::from("4")).unwrap(),
        Value::Int(4)
    );
}
