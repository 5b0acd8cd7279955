//! # Rule Invocation
//!
//! Runs a property's transform and validation rules. Inline rules are
//! called directly; service rules are resolved through the locator, checked
//! for the required capability and invoked with the rule's extra
//! arguments.
//!
//! Errors raised by rules themselves are returned as
//! [`BindError::Rule`] without modification.

use formbind_core::{BindError, Capability, Value};
use formbind_schema::{TransformRule, ValidationRule};

use crate::service::{missing, ServiceLocator};

/// Apply a transform rule to `value`.
///
/// # Errors
///
/// - `BindError::Lookup` if a service name does not resolve.
/// - `BindError::Configuration` if the service is not a transformer.
/// - `BindError::Rule` with whatever the rule raised.
pub fn transform(
    rule: &TransformRule,
    value: Value,
    locator: &dyn ServiceLocator,
) -> Result<Value, BindError> {
    match rule {
        TransformRule::Inline(inline) => inline.transform(value).map_err(BindError::Rule),
        TransformRule::Service(service_ref) => {
            let service = locator.resolve(service_ref.name())?;
            let transformer = service
                .as_transformer()
                .ok_or_else(|| missing(service_ref.name(), Capability::Transformer))?;
            transformer
                .transform(value, service_ref.arguments())
                .map_err(BindError::Rule)
        }
    }
}

/// Run a validation rule against `value`.
///
/// # Errors
///
/// - `BindError::Lookup` if a service name does not resolve.
/// - `BindError::Configuration` if the service is not a validator.
/// - `BindError::Rule` with whatever the validator raised.
pub fn validate(
    rule: &ValidationRule,
    value: &Value,
    locator: &dyn ServiceLocator,
) -> Result<(), BindError> {
    match rule {
        ValidationRule::Inline(inline) => inline.validate(value).map_err(BindError::Rule),
        ValidationRule::Service(service_ref) => {
            let service = locator.resolve(service_ref.name())?;
            let validator = service
                .as_validator()
                .ok_or_else(|| missing(service_ref.name(), Capability::Validator))?;
            validator
                .validate(value, service_ref.arguments())
                .map_err(BindError::Rule)
        }
    }
}
