//! # Type Catalog
//!
//! Named declared types are resolved against a [`TypeCatalog`]: the set of
//! enums, classes and interfaces the host application makes bindable. A
//! name the catalog does not know is a configuration error at bind time.
//!
//! Enums take precedence over classes registered under the same name.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use formbind_core::{DeclaredType, EnumDescriptor};

/// Whether a registered object type is a class or an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// A concrete or abstract class.
    Class,
    /// An interface.
    Interface,
}

impl ObjectKind {
    /// Returns the lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a type name resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedType<'a> {
    /// A registered enum.
    Enum(&'a EnumDescriptor),
    /// A registered class or interface.
    Object(&'a str, ObjectKind),
}

/// Registry of the named types properties may be declared with.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    enums: BTreeMap<String, Arc<EnumDescriptor>>,
    objects: BTreeMap<String, ObjectKind>,
}

impl TypeCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an enum, replacing any enum of the same name.
    pub fn register_enum(&mut self, descriptor: EnumDescriptor) -> &mut Self {
        self.enums
            .insert(descriptor.name().to_string(), Arc::new(descriptor));
        self
    }

    /// Register a class name.
    pub fn register_class(&mut self, name: impl Into<String>) -> &mut Self {
        self.objects.insert(name.into(), ObjectKind::Class);
        self
    }

    /// Register an interface name.
    pub fn register_interface(&mut self, name: impl Into<String>) -> &mut Self {
        self.objects.insert(name.into(), ObjectKind::Interface);
        self
    }

    /// Builder-style [`register_enum`](Self::register_enum).
    #[must_use]
    pub fn with_enum(mut self, descriptor: EnumDescriptor) -> Self {
        self.register_enum(descriptor);
        self
    }

    /// Builder-style [`register_class`](Self::register_class).
    #[must_use]
    pub fn with_class(mut self, name: impl Into<String>) -> Self {
        self.register_class(name);
        self
    }

    /// Builder-style [`register_interface`](Self::register_interface).
    #[must_use]
    pub fn with_interface(mut self, name: impl Into<String>) -> Self {
        self.register_interface(name);
        self
    }

    /// Add every registration of `other`, which wins on conflicts.
    pub fn merge(&mut self, other: TypeCatalog) -> &mut Self {
        self.enums.extend(other.enums);
        self.objects.extend(other.objects);
        self
    }

    /// The enum registered as `name`.
    pub fn enum_descriptor(&self, name: &str) -> Option<&EnumDescriptor> {
        self.enums.get(name).map(Arc::as_ref)
    }

    /// Resolve a type name.
    pub fn resolve(&self, name: &str) -> Option<ResolvedType<'_>> {
        if let Some(descriptor) = self.enums.get(name) {
            return Some(ResolvedType::Enum(descriptor));
        }
        self.objects
            .get_key_value(name)
            .map(|(name, kind)| ResolvedType::Object(name, *kind))
    }

    /// Resolve the name of a named, enum or class declared type. Primitive
    /// and composite types resolve to `None`, as do enum and class types
    /// whose name is registered as the other kind.
    pub fn resolve_type(&self, declared: &DeclaredType) -> Option<ResolvedType<'_>> {
        match (declared, declared.name().and_then(|name| self.resolve(name))) {
            (DeclaredType::Named(_), resolved) => resolved,
            (DeclaredType::Enum(_), Some(resolved @ ResolvedType::Enum(_))) => Some(resolved),
            (DeclaredType::Class(_), Some(resolved @ ResolvedType::Object(..))) => Some(resolved),
            _ => None,
        }
    }

    /// Registered enums, by name.
    pub fn enums(&self) -> impl Iterator<Item = &EnumDescriptor> {
        self.enums.values().map(Arc::as_ref)
    }

    /// Registered classes and interfaces, by name.
    pub fn objects(&self) -> impl Iterator<Item = (&str, ObjectKind)> {
        self.objects.iter().map(|(name, kind)| (name.as_str(), *kind))
    }
}
