//! # Object Builder
//!
//! Binds a (pre-processed) input record to a [`ClassSchema`]. Properties
//! are handled in declaration order:
//!
//! 1. Resolve the effective key.
//! 2. Retrieve the value: key presence for key-only properties, else the
//!    input value, else the default. A missing key without a default
//!    fails. Defaults are assigned as they are and skip the remaining
//!    steps.
//! 3. Transform.
//! 4. Resolve the declared type (unsupported types fail here).
//! 5. Short-circuit null for nullable typed properties.
//! 6. Coerce.
//! 7. Validate, stopping at the first failure.
//! 8. Assign and record the key as consumed.
//!
//! Input keys no property consumed fail the whole bind. The instance is
//! only returned once every property is set.

use formbind_core::{BindError, Record, ValidationFailure, Value};
use formbind_schema::{ClassSchema, Instance, PropertySchema, TypeCatalog};

use crate::coerce::Coercion;
use crate::invoke;
use crate::service::ServiceLocator;

/// Builds instances from input records.
#[derive(Clone, Copy)]
pub struct ObjectBuilder<'a> {
    locator: &'a dyn ServiceLocator,
    catalog: &'a TypeCatalog,
}

impl<'a> ObjectBuilder<'a> {
    /// A builder resolving services through `locator` and named types
    /// through `catalog`.
    pub fn new(locator: &'a dyn ServiceLocator, catalog: &'a TypeCatalog) -> Self {
        Self { locator, catalog }
    }

    /// Bind `input` to `schema`.
    ///
    /// # Errors
    ///
    /// The first failure of any step, for any property, in declaration
    /// order; then `ValidationFailure::ExtraKeys` for unconsumed keys.
    pub fn build(&self, input: &Record, schema: &ClassSchema) -> Result<Instance, BindError> {
        let mut fields = Record::new();
        let mut consumed: Vec<&str> = Vec::with_capacity(schema.properties().len());

        for property in schema.properties() {
            let value = self.property_value(input, property)?;
            tracing::trace!(
                property = property.name(),
                key = property.key(),
                kind = value.type_name(),
                "bound property"
            );
            fields.insert(property.name(), value);
            consumed.push(property.key());
        }

        let extra: Vec<String> = input
            .keys()
            .filter(|key| !consumed.contains(key))
            .map(str::to_string)
            .collect();
        if !extra.is_empty() {
            return Err(ValidationFailure::ExtraKeys { keys: extra }.into());
        }

        Ok(Instance::new(schema.name(), fields))
    }

    fn property_value(&self, input: &Record, property: &PropertySchema) -> Result<Value, BindError> {
        let key = property.key();
        let raw = if property.is_key_only() {
            Value::Bool(input.contains_key(key))
        } else if let Some(value) = input.get(key) {
            value.clone()
        } else {
            return default_value(property);
        };
        self.process(raw, property)
    }

    fn process(&self, value: Value, property: &PropertySchema) -> Result<Value, BindError> {
        let value = match property.transform() {
            Some(rule) => invoke::transform(rule, value, self.locator)?,
            None => value,
        };

        let coercion = Coercion::for_property(property, self.catalog)?;
        if value.is_null() && property.is_nullable() && !coercion.is_dynamic() {
            return Ok(Value::Null);
        }
        let value = coercion.apply(value, property)?;

        for rule in property.validators() {
            invoke::validate(rule, &value, self.locator)?;
        }
        Ok(value)
    }
}

/// The value of a property whose key is absent.
///
/// Untyped properties cannot tell a null default from no default, so a
/// null default counts as missing for them.
fn default_value(property: &PropertySchema) -> Result<Value, BindError> {
    let default = match (property.declared_type(), property.default()) {
        (Some(_), Some(default)) => Some(default),
        (None, Some(default)) if !default.is_null() => Some(default),
        _ => None,
    };
    default.cloned().ok_or_else(|| {
        ValidationFailure::MissingKey {
            property: property.name().to_string(),
            key: property.key().to_string(),
        }
        .into()
    })
}
