//! # Services and the Service Locator
//!
//! Named pre-processors, transformers and validators are resolved at bind
//! time through a [`ServiceLocator`]. A resolved [`Service`] advertises the
//! capabilities it implements; asking it for one it lacks is a
//! configuration error, not a lookup error.
//!
//! Validators use the throwing convention: they return `Ok(())` to accept
//! a value and any error to reject it, and the binder passes the error to
//! the caller unchanged.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use formbind_core::{Capability, ConfigurationError, LookupError, Record, RuleError, Value};
use formbind_schema::Arguments;

/// Rewrites a whole input record before binding.
pub trait PreProcessor: Send + Sync {
    /// Produce the record the next stage sees.
    fn process(&self, input: Record) -> Result<Record, RuleError>;
}

/// Transforms one property value before coercion.
pub trait Transformer: Send + Sync {
    /// Transform `value`, given the property's extra arguments.
    fn transform(&self, value: Value, args: &Arguments) -> Result<Value, RuleError>;
}

/// Validates one coerced property value.
pub trait Validator: Send + Sync {
    /// Accept `value` or reject it with an error.
    fn validate(&self, value: &Value, args: &Arguments) -> Result<(), RuleError>;
}

/// A named service exposing any subset of the three capabilities.
pub trait Service: Send + Sync {
    /// The pre-processing capability.
    fn as_pre_processor(&self) -> Option<&dyn PreProcessor> {
        None
    }

    /// The transform capability.
    fn as_transformer(&self) -> Option<&dyn Transformer> {
        None
    }

    /// The validation capability.
    fn as_validator(&self) -> Option<&dyn Validator> {
        None
    }
}

/// Capabilities `service` exposes, in a fixed order.
pub fn capabilities(service: &dyn Service) -> Vec<Capability> {
    let mut found = Vec::new();
    if service.as_pre_processor().is_some() {
        found.push(Capability::PreProcessor);
    }
    if service.as_transformer().is_some() {
        found.push(Capability::Transformer);
    }
    if service.as_validator().is_some() {
        found.push(Capability::Validator);
    }
    found
}

pub(crate) fn missing(service: &str, capability: Capability) -> ConfigurationError {
    ConfigurationError::MissingCapability {
        service: service.to_string(),
        capability,
    }
}

/// Resolves service names to services.
///
/// The binder only reads through the locator; implementations shared
/// between threads are responsible for their own synchronisation.
pub trait ServiceLocator: Send + Sync {
    /// Resolve `name`.
    fn resolve(&self, name: &str) -> Result<Arc<dyn Service>, LookupError>;
}

/// A [`ServiceLocator`] backed by an in-memory map.
#[derive(Clone, Default)]
pub struct ServiceRegistry {
    services: BTreeMap<String, Arc<dyn Service>>,
}

impl ServiceRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `service` under `name`, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, service: impl Service + 'static) -> &mut Self {
        self.services.insert(name.into(), Arc::new(service));
        self
    }

    /// Register an already shared service.
    pub fn register_arc(&mut self, name: impl Into<String>, service: Arc<dyn Service>) -> &mut Self {
        self.services.insert(name.into(), service);
        self
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, service: impl Service + 'static) -> Self {
        self.register(name, service);
        self
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    /// Registered names with their capabilities, sorted by name.
    pub fn entries(&self) -> impl Iterator<Item = (&str, Vec<Capability>)> {
        self.services
            .iter()
            .map(|(name, service)| (name.as_str(), capabilities(service.as_ref())))
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.services.keys()).finish()
    }
}

impl ServiceLocator for ServiceRegistry {
    fn resolve(&self, name: &str) -> Result<Arc<dyn Service>, LookupError> {
        self.services
            .get(name)
            .cloned()
            .ok_or_else(|| LookupError::NotFound {
                name: name.to_string(),
            })
    }
}

impl<L: ServiceLocator + ?Sized> ServiceLocator for Arc<L> {
    fn resolve(&self, name: &str) -> Result<Arc<dyn Service>, LookupError> {
        (**self).resolve(name)
    }
}
