//! # Class and Property Schemas
//!
//! A [`ClassSchema`] is the immutable description of a bind target: its
//! properties in declaration order and the pre-processor services applied
//! to the whole input first. Each [`PropertySchema`] records where the
//! property's value comes from (effective key, key-presence flag, default),
//! its declared type, and the rules attached to it.
//!
//! Schemas are assembled with builders. All static checks run in
//! `build()`: rule attributes are classified, at most one transform is
//! allowed per property, and property names and effective keys must be
//! unique within a class. A schema that builds never needs to be checked
//! again, so it can be cached and shared freely.

use std::sync::Arc;

use formbind_core::{ConfigurationError, DeclaredType, Value};

use crate::rules::{classify, RuleAttribute, TransformRule, ValidationRule};

// ─── Property Schema ─────────────────────────────────────────────────

/// One property of a bind target.
#[derive(Debug, Clone)]
pub struct PropertySchema {
    name: String,
    key: Option<String>,
    declared_type: Option<DeclaredType>,
    nullable: bool,
    default: Option<Value>,
    key_only: bool,
    use_backing_value: bool,
    transform: Option<TransformRule>,
    validators: Vec<ValidationRule>,
}

impl PropertySchema {
    /// Start a property with a declared type.
    pub fn typed(name: impl Into<String>, declared_type: DeclaredType) -> PropertyBuilder {
        PropertyBuilder::new(name.into(), Some(declared_type))
    }

    /// Start an untyped (fully dynamic) property.
    pub fn untyped(name: impl Into<String>) -> PropertyBuilder {
        PropertyBuilder::new(name.into(), None)
    }

    /// Property name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The input key the value is read from: the override key if one was
    /// set, else the property name.
    pub fn key(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.name)
    }

    /// Whether the input key was overridden.
    pub fn is_renamed(&self) -> bool {
        self.key.is_some()
    }

    /// The declared type, `None` for untyped properties.
    pub fn declared_type(&self) -> Option<&DeclaredType> {
        self.declared_type.as_ref()
    }

    /// Whether the declared type admits null.
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// The default value, if one was declared.
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Whether the value is the presence of the key rather than its value.
    pub fn is_key_only(&self) -> bool {
        self.key_only
    }

    /// Whether backed enums are matched by backing value rather than by
    /// case name.
    pub fn use_backing_value(&self) -> bool {
        self.use_backing_value
    }

    /// The transform rule, if any.
    pub fn transform(&self) -> Option<&TransformRule> {
        self.transform.as_ref()
    }

    /// Validation rules in attachment order.
    pub fn validators(&self) -> &[ValidationRule] {
        &self.validators
    }
}

#[derive(Debug)]
enum PendingRule {
    Transform(TransformRule),
    Validate(ValidationRule),
    Attribute(Arc<dyn RuleAttribute>),
}

/// Builder for [`PropertySchema`].
#[derive(Debug)]
#[must_use]
pub struct PropertyBuilder {
    name: String,
    declared_type: Option<DeclaredType>,
    nullable: bool,
    default: Option<Value>,
    key: Option<String>,
    key_only: bool,
    use_backing_value: bool,
    rules: Vec<PendingRule>,
}

impl PropertyBuilder {
    fn new(name: String, declared_type: Option<DeclaredType>) -> Self {
        Self {
            name,
            declared_type,
            nullable: false,
            default: None,
            key: None,
            key_only: false,
            use_backing_value: false,
            rules: Vec::new(),
        }
    }

    /// Let the declared type admit null.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Set the nullability flag explicitly.
    pub fn set_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Declare a default value, used when the key is absent.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Read the value from `key` instead of the property name.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Bind the presence of the key as a boolean.
    pub fn key_only(mut self) -> Self {
        self.key_only = true;
        self
    }

    /// Match backed enums by backing value.
    pub fn use_backing_value(mut self) -> Self {
        self.use_backing_value = true;
        self
    }

    /// Attach a transform rule.
    pub fn transform(mut self, rule: TransformRule) -> Self {
        self.rules.push(PendingRule::Transform(rule));
        self
    }

    /// Attach a validation rule.
    pub fn validate(mut self, rule: ValidationRule) -> Self {
        self.rules.push(PendingRule::Validate(rule));
        self
    }

    /// Attach a rule attribute, classified when the schema is built.
    pub fn attribute(mut self, attribute: Arc<dyn RuleAttribute>) -> Self {
        self.rules.push(PendingRule::Attribute(attribute));
        self
    }

    /// Build the property schema.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError::AmbiguousRule` if an attribute exposes both
    ///   forms of one capability.
    /// - `ConfigurationError::MultipleTransforms` if more than one
    ///   transform ends up attached.
    pub fn build(self) -> Result<PropertySchema, ConfigurationError> {
        let mut transform: Option<TransformRule> = None;
        let mut validators = Vec::new();

        for pending in self.rules {
            let (new_transform, new_validator) = match pending {
                PendingRule::Transform(rule) => (Some(rule), None),
                PendingRule::Validate(rule) => (None, Some(rule)),
                PendingRule::Attribute(attribute) => {
                    let classified = classify(&attribute, &self.name)?;
                    (classified.transform, classified.validation)
                }
            };
            if let Some(rule) = new_transform {
                if transform.is_some() {
                    return Err(ConfigurationError::MultipleTransforms {
                        property: self.name,
                    });
                }
                transform = Some(rule);
            }
            validators.extend(new_validator);
        }

        if self.declared_type.is_none() && matches!(self.default, Some(Value::Null)) {
            tracing::warn!(
                property = %self.name,
                "untyped property declares a null default; an absent key is reported as missing"
            );
        }

        Ok(PropertySchema {
            name: self.name,
            key: self.key,
            declared_type: self.declared_type,
            nullable: self.nullable,
            default: self.default,
            key_only: self.key_only,
            use_backing_value: self.use_backing_value,
            transform,
            validators,
        })
    }
}

// ─── Class Schema ────────────────────────────────────────────────────

/// Immutable description of a bind target.
#[derive(Debug, Clone)]
pub struct ClassSchema {
    name: String,
    properties: Vec<PropertySchema>,
    pre_processors: Vec<String>,
}

impl ClassSchema {
    /// Start a schema for the target called `name`.
    pub fn builder(name: impl Into<String>) -> ClassSchemaBuilder {
        ClassSchemaBuilder {
            name: name.into(),
            properties: Vec::new(),
            pre_processors: Vec::new(),
        }
    }

    /// Target name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Properties in declaration order.
    pub fn properties(&self) -> &[PropertySchema] {
        &self.properties
    }

    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Option<&PropertySchema> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Pre-processor service names in application order.
    pub fn pre_processors(&self) -> &[String] {
        &self.pre_processors
    }
}

/// Builder for [`ClassSchema`].
#[derive(Debug)]
#[must_use]
pub struct ClassSchemaBuilder {
    name: String,
    properties: Vec<PropertyBuilder>,
    pre_processors: Vec<String>,
}

impl ClassSchemaBuilder {
    /// Append a property.
    pub fn property(mut self, property: PropertyBuilder) -> Self {
        self.properties.push(property);
        self
    }

    /// Append a pre-processor service.
    pub fn pre_process(mut self, service: impl Into<String>) -> Self {
        self.pre_processors.push(service.into());
        self
    }

    /// Build the schema, building every property.
    ///
    /// # Errors
    ///
    /// Any error from [`PropertyBuilder::build`], plus
    /// `ConfigurationError::DuplicateProperty` and
    /// `ConfigurationError::DuplicateKey` when two properties share a name
    /// or an effective key.
    pub fn build(self) -> Result<ClassSchema, ConfigurationError> {
        let mut properties: Vec<PropertySchema> = Vec::with_capacity(self.properties.len());
        for builder in self.properties {
            let property = builder.build()?;
            if properties.iter().any(|p| p.name == property.name) {
                return Err(ConfigurationError::DuplicateProperty {
                    schema: self.name,
                    property: property.name,
                });
            }
            if let Some(first) = properties.iter().find(|p| p.key() == property.key()) {
                return Err(ConfigurationError::DuplicateKey {
                    key: property.key().to_string(),
                    first: first.name.clone(),
                    second: property.name,
                });
            }
            properties.push(property);
        }
        Ok(ClassSchema {
            name: self.name,
            properties,
            pre_processors: self.pre_processors,
        })
    }
}
