//! Shared fixtures for the binder integration tests.

#![allow(dead_code)]

use std::any::Any;

use formbind_bind::{Binder, ServiceRegistry};
use formbind_core::{BindError, EnumDescriptor, HostObject, ObjectRef, Record, Value};
use formbind_schema::{ClassSchema, Instance, PropertyBuilder, TypeCatalog};

/// An uploaded file: class `Upload`, child of `File`, implements `Named`.
#[derive(Debug)]
pub struct Upload;

impl HostObject for Upload {
    fn class_name(&self) -> &str {
        "Upload"
    }

    fn is_instance_of(&self, type_name: &str) -> bool {
        matches!(type_name, "Upload" | "File" | "Named")
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An object of an unrelated class.
#[derive(Debug)]
pub struct Other;

impl HostObject for Other {
    fn class_name(&self) -> &str {
        "Other"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An object with a string form.
#[derive(Debug)]
pub struct Text(pub &'static str);

impl HostObject for Text {
    fn class_name(&self) -> &str {
        "Text"
    }

    fn to_text(&self) -> Option<String> {
        Some(self.0.to_string())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn object(host: impl HostObject) -> Value {
    Value::Object(ObjectRef::new(host))
}

/// Enums `Suit` (pure), `Plan` (string-backed), `Answer` (int-backed);
/// classes `Upload`, `File`, `Other`; interface `Named`.
pub fn catalog() -> TypeCatalog {
    TypeCatalog::new()
        .with_enum(EnumDescriptor::pure("Suit", ["Hearts", "Spades"]).unwrap())
        .with_enum(EnumDescriptor::backed_string("Plan", [("Free", "free"), ("Pro", "pro")]).unwrap())
        .with_enum(EnumDescriptor::backed_int("Answer", [("Bar", 42), ("Baz", 7)]).unwrap())
        .with_class("Upload")
        .with_class("File")
        .with_class("Other")
        .with_interface("Named")
}

pub fn enum_case(enum_name: &str, case: &str) -> Value {
    let catalog = catalog();
    let descriptor = catalog.enum_descriptor(enum_name).unwrap();
    Value::Enum(descriptor.case(case).unwrap().clone())
}

pub fn record(json: serde_json::Value) -> Record {
    Record::try_from(json).unwrap()
}

pub fn schema(property: PropertyBuilder) -> ClassSchema {
    ClassSchema::builder("Form").property(property).build().unwrap()
}

pub fn binder(registry: ServiceRegistry) -> Binder {
    Binder::new(registry).with_catalog(catalog())
}

pub fn bind(input: &Record, schema: &ClassSchema) -> Result<Instance, BindError> {
    binder(ServiceRegistry::new()).bind_instance(input, schema)
}

pub fn bind_json(input: serde_json::Value, schema: &ClassSchema) -> Result<Instance, BindError> {
    bind(&record(input), schema)
}

/// Bind `{"foo": value}` to a schema with one property and return the
/// bound value of `foo`.
pub fn bind_foo(property: PropertyBuilder, value: Value) -> Result<Value, BindError> {
    let mut input = Record::new();
    input.insert("foo", value);
    let instance = bind(&input, &schema(property))?;
    Ok(instance.get("foo").cloned().unwrap_or_default())
}
