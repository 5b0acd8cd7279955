//! # Schema Cache
//!
//! Deriving a [`ClassSchema`] is a pure function of the target type, so a
//! derived schema can be shared for the life of the process. A
//! [`SchemaCache`] is an explicit value: create it once at startup, share
//! it through `Arc`, and it never invalidates anything.
//!
//! Derivation runs outside the lock. Two callers racing on the same type
//! both derive, and whichever inserts first wins; the values are equal, so
//! readers cannot tell.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use formbind_core::ConfigurationError;

use crate::schema::ClassSchema;
use crate::target::Bindable;

/// Process-wide store of derived schemas, keyed by target type.
#[derive(Debug, Default)]
pub struct SchemaCache {
    schemas: RwLock<HashMap<TypeId, Arc<ClassSchema>>>,
}

impl SchemaCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The schema of `T`, deriving it on first use.
    ///
    /// # Errors
    ///
    /// Whatever `T::schema()` returns. Failed derivations are not cached.
    pub fn schema_for<T: Bindable>(&self) -> Result<Arc<ClassSchema>, ConfigurationError> {
        let id = TypeId::of::<T>();
        if let Some(schema) = self.schemas.read().get(&id) {
            return Ok(Arc::clone(schema));
        }

        let schema = Arc::new(T::schema()?);
        tracing::debug!(
            target_type = type_name::<T>(),
            properties = schema.properties().len(),
            "derived class schema"
        );
        let mut schemas = self.schemas.write();
        Ok(Arc::clone(schemas.entry(id).or_insert(schema)))
    }

    /// Whether the schema of `T` has been derived.
    pub fn contains<T: Bindable>(&self) -> bool {
        self.schemas.read().contains_key(&TypeId::of::<T>())
    }

    /// Number of cached schemas.
    pub fn len(&self) -> usize {
        self.schemas.read().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.schemas.read().is_empty()
    }
}
