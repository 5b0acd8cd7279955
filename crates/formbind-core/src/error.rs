//! # Error Types: Binding Error Hierarchy
//!
//! Defines the errors produced while binding an input record to a target
//! schema. All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! Two kinds of failure are never conflated:
//!
//! - [`ValidationFailure`] is a data problem. It is expected, user-facing,
//!   and always names the offending property.
//! - [`ConfigurationError`] is a schema or wiring mistake. It is not
//!   user-facing and retrying the same call cannot fix it.
//!
//! Errors raised by user-supplied rules, pre-processors and validator
//! services travel in [`BindError::Rule`] exactly as they were raised.
//! Callers can downcast them back to their concrete type.

use std::fmt;

use thiserror::Error;

/// Error raised by user-supplied rule objects and services.
///
/// The binder never wraps or reinterprets these.
pub type RuleError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error returned by every bind operation.
#[derive(Error, Debug)]
pub enum BindError {
    /// The input data was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// The schema or service wiring is broken.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The service locator could not produce a named service.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// Error raised by a rule object, pre-processor or validator service,
    /// propagated unmodified.
    #[error(transparent)]
    Rule(RuleError),
}

impl BindError {
    /// Whether this error is a data validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Whether this error is a configuration error.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// The validation failure, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationFailure> {
        match self {
            Self::Validation(failure) => Some(failure),
            _ => None,
        }
    }

    /// The configuration error, if this is one.
    pub fn as_configuration(&self) -> Option<&ConfigurationError> {
        match self {
            Self::Configuration(error) => Some(error),
            _ => None,
        }
    }

    /// Downcast a propagated rule error to its concrete type.
    pub fn downcast_rule<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::Rule(error) => error.downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// Rejected input data.
///
/// Display strings are stable and form part of the public contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    /// A required property's key is absent from the input.
    #[error("Missing key: {key}")]
    MissingKey {
        /// Name of the property.
        property: String,
        /// Effective input key that was looked up.
        key: String,
    },

    /// The input contains keys no property consumed.
    #[error("Input data contains extra keys: {}", .keys.join(", "))]
    ExtraKeys {
        /// Unconsumed keys, in input order.
        keys: Vec<String>,
    },

    /// The value's runtime type is not acceptable for the declared type.
    #[error("Value for ${key} has invalid type, expected {expected}, got {actual}")]
    InvalidType {
        /// Name of the property.
        property: String,
        /// Effective input key.
        key: String,
        /// Description of the accepted forms.
        expected: String,
        /// Type name of the rejected value.
        actual: String,
    },

    /// The value has an acceptable type but matches no enum case.
    #[error("Invalid value for ${key}: {value}")]
    InvalidValue {
        /// Name of the property.
        property: String,
        /// Effective input key.
        key: String,
        /// Textual form of the rejected value.
        value: String,
    },
}

impl ValidationFailure {
    /// The property this failure is about. `None` for extra keys, which
    /// belong to no property.
    pub fn property(&self) -> Option<&str> {
        match self {
            Self::MissingKey { property, .. }
            | Self::InvalidType { property, .. }
            | Self::InvalidValue { property, .. } => Some(property),
            Self::ExtraKeys { .. } => None,
        }
    }
}

/// Capability a named service is expected to expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Whole-input pre-processing.
    PreProcessor,
    /// Per-property value transformation.
    Transformer,
    /// Per-property value validation.
    Validator,
}

impl Capability {
    /// Returns the capability name used in messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreProcessor => "PreProcessor",
            Self::Transformer => "Transformer",
            Self::Validator => "Validator",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of per-property rule, for ambiguity reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// Transformation rule.
    Transform,
    /// Validation rule.
    Validate,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transform => f.write_str("transformer"),
            Self::Validate => f.write_str("validator"),
        }
    }
}

/// Schema or wiring mistake.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A resolved service does not expose the required capability.
    #[error("Service {service} does not implement {capability}")]
    MissingCapability {
        /// Service name passed to the locator.
        service: String,
        /// The capability that was required.
        capability: Capability,
    },

    /// The declared type is permanently unsupported (`float`, `iterable`).
    #[error("Handling of {type_name} properties is not implemented (property {property})")]
    NotImplemented {
        /// Name of the property.
        property: String,
        /// The declared type.
        type_name: String,
    },

    /// Union and intersection types are rejected.
    #[error("Union/intersection types are not supported (property {property}: {type_name})")]
    UnsupportedType {
        /// Name of the property.
        property: String,
        /// The declared type.
        type_name: String,
    },

    /// The type name is neither a primitive nor a registered enum, class
    /// or interface.
    #[error("Cannot handle properties of type {type_name} (property {property})")]
    UnresolvableType {
        /// Name of the property.
        property: String,
        /// The unresolved type name.
        type_name: String,
    },

    /// A rule attribute exposes both the inline and the service form of
    /// the same capability.
    #[error("Attribute {attribute} on property {property} must implement either an inline or a service {kind} but not both")]
    AmbiguousRule {
        /// Name of the property.
        property: String,
        /// Name of the attribute type.
        attribute: String,
        /// Which capability is ambiguous.
        kind: RuleKind,
    },

    /// More than one transform rule was attached to a property.
    #[error("Only 1 transformer can be attached to a property (property {property})")]
    MultipleTransforms {
        /// Name of the property.
        property: String,
    },

    /// Two properties share a name.
    #[error("Duplicate property {property} in schema {schema}")]
    DuplicateProperty {
        /// Name of the schema.
        schema: String,
        /// The duplicated property name.
        property: String,
    },

    /// Two properties resolve to the same effective input key.
    #[error("Properties {first} and {second} both read input key {key}")]
    DuplicateKey {
        /// The shared effective key.
        key: String,
        /// The property declared first.
        first: String,
        /// The property declared second.
        second: String,
    },

    /// An enum declares the same case name twice.
    #[error("Enum {enum_name} declares case {case} more than once")]
    DuplicateEnumCase {
        /// Name of the enum.
        enum_name: String,
        /// The duplicated case name.
        case: String,
    },

    /// A backed enum declares the same backing value twice.
    #[error("Enum {enum_name} declares backing value {value} more than once")]
    DuplicateBackingValue {
        /// Name of the enum.
        enum_name: String,
        /// The duplicated backing value.
        value: String,
    },

    /// A bound value does not fit the Rust field it is extracted into.
    #[error("Property {property} of {class} cannot be read as {expected}, found {actual}")]
    FieldMismatch {
        /// Name of the target type.
        class: String,
        /// Name of the property.
        property: String,
        /// The Rust-side expectation.
        expected: String,
        /// Type name of the bound value, or `absent`.
        actual: String,
    },
}

/// The service locator could not produce a service.
#[derive(Error, Debug)]
pub enum LookupError {
    /// No service is registered under the name.
    #[error("Service {name} not found")]
    NotFound {
        /// The requested service name.
        name: String,
    },

    /// The locator failed while constructing or fetching the service.
    #[error("Service {name} could not be resolved: {source}")]
    Failed {
        /// The requested service name.
        name: String,
        /// Locator-specific cause.
        #[source]
        source: RuleError,
    },
}
