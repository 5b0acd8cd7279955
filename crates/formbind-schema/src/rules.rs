//! # Transform and Validation Rules
//!
//! A property carries at most one [`TransformRule`] and any number of
//! [`ValidationRule`]s. Each rule is either an inline rule object that
//! does the work itself, or a [`ServiceRef`] naming an external service
//! that the binder resolves through its service locator.
//!
//! ## Rule Attributes
//!
//! Schemas may also attach arbitrary [`RuleAttribute`] objects, which
//! declare which capabilities they expose. Attributes are classified into
//! the closed rule variants once, when the property schema is built. An
//! attribute exposing both the inline and the service form of the same
//! capability is rejected there, never probed at bind time.

use std::fmt;
use std::sync::Arc;

use formbind_core::{ConfigurationError, RuleError, RuleKind, Value};

use crate::arguments::Arguments;

/// A rule object that transforms a value itself.
pub trait InlineTransform: fmt::Debug + Send + Sync {
    /// Transform the value.
    fn transform(&self, value: Value) -> Result<Value, RuleError>;
}

/// A rule object that validates a value itself.
///
/// Rejection is signalled by returning any error; the binder passes it to
/// the caller unmodified.
pub trait InlineValidate: fmt::Debug + Send + Sync {
    /// Validate the value.
    fn validate(&self, value: &Value) -> Result<(), RuleError>;
}

/// Reference to a named service plus the extra arguments it is invoked
/// with.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRef {
    name: String,
    arguments: Arguments,
}

impl ServiceRef {
    /// Reference a service with no extra arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Arguments::new(),
        }
    }

    /// Set the extra arguments.
    pub fn with_arguments(mut self, arguments: Arguments) -> Self {
        self.arguments = arguments;
        self
    }

    /// Name passed to the service locator.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extra arguments passed to the service.
    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }
}

impl fmt::Display for ServiceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// How a property's value is transformed before coercion.
#[derive(Debug, Clone)]
pub enum TransformRule {
    /// The rule object transforms the value itself.
    Inline(Arc<dyn InlineTransform>),
    /// A named service transforms the value.
    Service(ServiceRef),
}

impl TransformRule {
    /// Inline rule from a rule object.
    pub fn inline(rule: impl InlineTransform + 'static) -> Self {
        Self::Inline(Arc::new(rule))
    }

    /// Inline rule from a closure.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(Value) -> Result<Value, RuleError> + Send + Sync + 'static,
    {
        Self::inline(FnRule(f))
    }

    /// Service rule without extra arguments.
    pub fn service(name: impl Into<String>) -> Self {
        Self::Service(ServiceRef::new(name))
    }

    /// Service rule with extra arguments.
    pub fn service_with(name: impl Into<String>, arguments: Arguments) -> Self {
        Self::Service(ServiceRef::new(name).with_arguments(arguments))
    }
}

/// How a property's coerced value is validated.
#[derive(Debug, Clone)]
pub enum ValidationRule {
    /// The rule object validates the value itself.
    Inline(Arc<dyn InlineValidate>),
    /// A named service validates the value.
    Service(ServiceRef),
}

impl ValidationRule {
    /// Inline rule from a rule object.
    pub fn inline(rule: impl InlineValidate + 'static) -> Self {
        Self::Inline(Arc::new(rule))
    }

    /// Inline rule from a closure.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<(), RuleError> + Send + Sync + 'static,
    {
        Self::inline(FnRule(f))
    }

    /// Service rule without extra arguments.
    pub fn service(name: impl Into<String>) -> Self {
        Self::Service(ServiceRef::new(name))
    }

    /// Service rule with extra arguments.
    pub fn service_with(name: impl Into<String>, arguments: Arguments) -> Self {
        Self::Service(ServiceRef::new(name).with_arguments(arguments))
    }
}

struct FnRule<F>(F);

impl<F> fmt::Debug for FnRule<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnRule")
    }
}

impl<F> InlineTransform for FnRule<F>
where
    F: Fn(Value) -> Result<Value, RuleError> + Send + Sync,
{
    fn transform(&self, value: Value) -> Result<Value, RuleError> {
        (self.0)(value)
    }
}

impl<F> InlineValidate for FnRule<F>
where
    F: Fn(&Value) -> Result<(), RuleError> + Send + Sync,
{
    fn validate(&self, value: &Value) -> Result<(), RuleError> {
        (self.0)(value)
    }
}

/// An object attached to a property that may expose any of the four rule
/// capabilities.
///
/// Every method defaults to "not exposed". Implementors override the ones
/// they support; an inline capability is exposed by returning `Some(self)`.
pub trait RuleAttribute: fmt::Debug + Send + Sync + 'static {
    /// Name used in configuration error messages.
    fn attribute_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// The inline transform capability.
    fn as_inline_transform(self: Arc<Self>) -> Option<Arc<dyn InlineTransform>> {
        None
    }

    /// The service transform capability.
    fn transformer_service(&self) -> Option<ServiceRef> {
        None
    }

    /// The inline validation capability.
    fn as_inline_validator(self: Arc<Self>) -> Option<Arc<dyn InlineValidate>> {
        None
    }

    /// The service validation capability.
    fn validator_service(&self) -> Option<ServiceRef> {
        None
    }
}

/// The rules a single attribute contributes.
#[derive(Debug, Default)]
pub(crate) struct ClassifiedAttribute {
    pub(crate) transform: Option<TransformRule>,
    pub(crate) validation: Option<ValidationRule>,
}

/// Resolve an attribute into rule variants.
pub(crate) fn classify(
    attribute: &Arc<dyn RuleAttribute>,
    property: &str,
) -> Result<ClassifiedAttribute, ConfigurationError> {
    let ambiguous = |kind| ConfigurationError::AmbiguousRule {
        property: property.to_string(),
        attribute: attribute.attribute_name().to_string(),
        kind,
    };

    let transform = match (
        Arc::clone(attribute).as_inline_transform(),
        attribute.transformer_service(),
    ) {
        (Some(_), Some(_)) => return Err(ambiguous(RuleKind::Transform)),
        (Some(inline), None) => Some(TransformRule::Inline(inline)),
        (None, Some(service)) => Some(TransformRule::Service(service)),
        (None, None) => None,
    };

    let validation = match (
        Arc::clone(attribute).as_inline_validator(),
        attribute.validator_service(),
    ) {
        (Some(_), Some(_)) => return Err(ambiguous(RuleKind::Validate)),
        (Some(inline), None) => Some(ValidationRule::Inline(inline)),
        (None, Some(service)) => Some(ValidationRule::Service(service)),
        (None, None) => None,
    };

    Ok(ClassifiedAttribute {
        transform,
        validation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Upper;

    impl InlineTransform for Upper {
        fn transform(&self, value: Value) -> Result<Value, RuleError> {
            Ok(match value {
                Value::String(s) => Value::String(s.to_uppercase()),
                other => other,
            })
        }
    }

    impl RuleAttribute for Upper {
        fn as_inline_transform(self: Arc<Self>) -> Option<Arc<dyn InlineTransform>> {
            Some(self)
        }
    }

    #[derive(Debug)]
    struct BothTransforms;

    impl InlineTransform for BothTransforms {
        fn transform(&self, value: Value) -> Result<Value, RuleError> {
            Ok(value)
        }
    }

    impl RuleAttribute for BothTransforms {
        fn attribute_name(&self) -> &'static str {
            "BothTransforms"
        }

        fn as_inline_transform(self: Arc<Self>) -> Option<Arc<dyn InlineTransform>> {
            Some(self)
        }

        fn transformer_service(&self) -> Option<ServiceRef> {
            Some(ServiceRef::new("trim"))
        }
    }

    #[derive(Debug)]
    struct TransformAndValidate;

    impl RuleAttribute for TransformAndValidate {
        fn transformer_service(&self) -> Option<ServiceRef> {
            Some(ServiceRef::new("trim"))
        }

        fn validator_service(&self) -> Option<ServiceRef> {
            Some(ServiceRef::new("non_empty"))
        }
    }

    #[derive(Debug)]
    struct Inert;

    impl RuleAttribute for Inert {}

    #[test]
    fn test_inline_attribute_classifies_as_inline_transform() {
        let attribute: Arc<dyn RuleAttribute> = Arc::new(Upper);
        let classified = classify(&attribute, "foo").unwrap();
        let Some(TransformRule::Inline(rule)) = classified.transform else {
            panic!("expected inline transform");
        };
        assert_eq!(rule.transform(Value::from("a")).unwrap(), Value::from("A"));
        assert!(classified.validation.is_none());
    }

    #[test]
    fn test_both_forms_of_one_capability_is_ambiguous() {
        let attribute: Arc<dyn RuleAttribute> = Arc::new(BothTransforms);
        let err = classify(&attribute, "foo").unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::AmbiguousRule {
                property: "foo".into(),
                attribute: "BothTransforms".into(),
                kind: RuleKind::Transform,
            }
        );
    }

    #[test]
    fn test_distinct_capabilities_may_be_combined() {
        let attribute: Arc<dyn RuleAttribute> = Arc::new(TransformAndValidate);
        let classified = classify(&attribute, "foo").unwrap();
        assert!(matches!(classified.transform, Some(TransformRule::Service(ref s)) if s.name() == "trim"));
        assert!(matches!(classified.validation, Some(ValidationRule::Service(ref s)) if s.name() == "non_empty"));
    }

    #[test]
    fn test_inert_attribute_contributes_nothing() {
        let attribute: Arc<dyn RuleAttribute> = Arc::new(Inert);
        let classified = classify(&attribute, "foo").unwrap();
        assert!(classified.transform.is_none());
        assert!(classified.validation.is_none());
        assert!(attribute.attribute_name().ends_with("Inert"));
    }

    #[test]
    fn test_closure_rules() {
        let TransformRule::Inline(rule) = TransformRule::from_fn(|_| Ok(Value::Int(1))) else {
            panic!("expected inline transform");
        };
        assert_eq!(rule.transform(Value::Null).unwrap(), Value::Int(1));

        let ValidationRule::Inline(rule) = ValidationRule::from_fn(|v| {
            if v.is_null() {
                Err("null".into())
            } else {
                Ok(())
            }
        }) else {
            panic!("expected inline validator");
        };
        assert!(rule.validate(&Value::Null).is_err());
        assert!(rule.validate(&Value::Int(0)).is_ok());
    }
}
