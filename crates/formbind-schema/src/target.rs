//! # Bind Targets
//!
//! The binder's raw output is an [`Instance`]: the target's name plus every
//! property value in declaration order. Rust types become bind targets by
//! implementing [`Bindable`], which declares the type's schema and
//! extracts typed fields from a finished instance.

use serde::ser::{Serialize, Serializer};

use formbind_core::{BindError, ConfigurationError, FromValue, Record, Value};

use crate::schema::ClassSchema;

/// A fully bound target: every property of the schema is set.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    class: String,
    fields: Record,
}

impl Instance {
    /// Wrap the bound fields of `class`.
    pub fn new(class: impl Into<String>, fields: Record) -> Self {
        Self {
            class: class.into(),
            fields,
        }
    }

    /// Name of the target.
    pub fn class_name(&self) -> &str {
        &self.class
    }

    /// The bound value of `property`.
    pub fn get(&self, property: &str) -> Option<&Value> {
        self.fields.get(property)
    }

    /// All bound values in declaration order.
    pub fn fields(&self) -> &Record {
        &self.fields
    }

    /// Consume into the bound values.
    pub fn into_record(self) -> Record {
        self.fields
    }

    /// Remove and convert the value of `property`.
    ///
    /// # Errors
    ///
    /// `ConfigurationError::FieldMismatch` if the property is absent or its
    /// value does not convert to `T`. Either means the Rust type and its
    /// schema disagree.
    pub fn take<T: FromValue>(&mut self, property: &str) -> Result<T, ConfigurationError> {
        let mismatch = |actual: &str| ConfigurationError::FieldMismatch {
            class: self.class.clone(),
            property: property.to_string(),
            expected: T::EXPECTED.to_string(),
            actual: actual.to_string(),
        };
        let value = self.fields.remove(property).ok_or_else(|| mismatch("absent"))?;
        let actual = value.type_name();
        T::from_value(value).ok_or_else(|| mismatch(actual))
    }
}

impl Serialize for Instance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

/// A Rust type that input can be bound to.
///
/// `schema()` is a pure function of the type: a schema cache calls it at
/// most once per type and shares the result.
pub trait Bindable: Sized + 'static {
    /// Describe the type's properties.
    fn schema() -> Result<ClassSchema, ConfigurationError>;

    /// Build the value from a bound instance of its schema.
    fn from_instance(instance: Instance) -> Result<Self, BindError>;
}
