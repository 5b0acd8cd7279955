//! # Binder
//!
//! The public entry point. A [`Binder`] owns the service locator, the type
//! catalog and the schema cache, and exposes the bind operations:
//!
//! - [`Binder::bind`] / [`Binder::bind_many`] for [`Bindable`] Rust types,
//!   whose schemas are derived once through the cache.
//! - [`Binder::bind_instance`] / [`Binder::bind_many_instances`] for
//!   schemas built at runtime, e.g. from a schema document.
//!
//! The `bind_many` variants are lazy: each input is bound to completion
//! when the iterator is advanced, and nothing is buffered. Dropping the
//! iterator stops the work.

use std::borrow::Borrow;
use std::marker::PhantomData;
use std::sync::Arc;

use formbind_core::{BindError, Record};
use formbind_schema::{Bindable, ClassSchema, Instance, SchemaCache, TypeCatalog};

use crate::builder::ObjectBuilder;
use crate::preprocess::pre_process;
use crate::service::ServiceLocator;

/// Binds untyped input records to typed targets.
#[derive(Clone)]
pub struct Binder {
    locator: Arc<dyn ServiceLocator>,
    catalog: Arc<TypeCatalog>,
    cache: Arc<SchemaCache>,
}

impl Binder {
    /// A binder with an empty type catalog and its own schema cache.
    pub fn new(locator: impl ServiceLocator + 'static) -> Self {
        Self::from_arc(Arc::new(locator))
    }

    /// A binder using an already shared locator.
    pub fn from_arc(locator: Arc<dyn ServiceLocator>) -> Self {
        Self {
            locator,
            catalog: Arc::new(TypeCatalog::new()),
            cache: Arc::new(SchemaCache::new()),
        }
    }

    /// Resolve named types against `catalog`.
    #[must_use]
    pub fn with_catalog(mut self, catalog: impl Into<Arc<TypeCatalog>>) -> Self {
        self.catalog = catalog.into();
        self
    }

    /// Share `cache` with other binders.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<SchemaCache>) -> Self {
        self.cache = cache;
        self
    }

    /// The type catalog.
    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    /// The schema cache.
    pub fn cache(&self) -> &Arc<SchemaCache> {
        &self.cache
    }

    /// Bind `input` to `schema`.
    ///
    /// # Errors
    ///
    /// The first failure of pre-processing or building. No partially
    /// bound instance is ever returned.
    pub fn bind_instance(&self, input: &Record, schema: &ClassSchema) -> Result<Instance, BindError> {
        tracing::debug!(schema = schema.name(), keys = input.len(), "binding input");
        let result = pre_process(input, schema, self.locator.as_ref()).and_then(|input| {
            ObjectBuilder::new(self.locator.as_ref(), &self.catalog).build(&input, schema)
        });
        match &result {
            Ok(_) => tracing::debug!(schema = schema.name(), "bound input"),
            Err(error) => tracing::debug!(schema = schema.name(), %error, "bind failed"),
        }
        result
    }

    /// Bind `input` to the Rust type `T`.
    ///
    /// # Errors
    ///
    /// A configuration error if `T`'s schema cannot be derived, then
    /// anything [`bind_instance`](Self::bind_instance) or
    /// `T::from_instance` returns.
    pub fn bind<T: Bindable>(&self, input: &Record) -> Result<T, BindError> {
        let schema = self.cache.schema_for::<T>()?;
        let instance = self.bind_instance(input, &schema)?;
        T::from_instance(instance)
    }

    /// Lazily bind each input to `T`.
    pub fn bind_many<T, I>(&self, inputs: I) -> BindMany<'_, T, I::IntoIter>
    where
        T: Bindable,
        I: IntoIterator,
        I::Item: Borrow<Record>,
    {
        BindMany {
            binder: self,
            inputs: inputs.into_iter(),
            target: PhantomData,
        }
    }

    /// Lazily bind each input to `schema`.
    pub fn bind_many_instances<'b, I>(
        &'b self,
        inputs: I,
        schema: &'b ClassSchema,
    ) -> BindManyInstances<'b, I::IntoIter>
    where
        I: IntoIterator,
        I::Item: Borrow<Record>,
    {
        BindManyInstances {
            binder: self,
            schema,
            inputs: inputs.into_iter(),
        }
    }
}

impl std::fmt::Debug for Binder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binder")
            .field("catalog", &self.catalog)
            .field("cached_schemas", &self.cache.len())
            .finish_non_exhaustive()
    }
}

/// Iterator returned by [`Binder::bind_many`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct BindMany<'b, T, I> {
    binder: &'b Binder,
    inputs: I,
    target: PhantomData<fn() -> T>,
}

impl<T, I> Iterator for BindMany<'_, T, I>
where
    T: Bindable,
    I: Iterator,
    I::Item: Borrow<Record>,
{
    type Item = Result<T, BindError>;

    fn next(&mut self) -> Option<Self::Item> {
        let input = self.inputs.next()?;
        Some(self.binder.bind::<T>(input.borrow()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inputs.size_hint()
    }
}

/// Iterator returned by [`Binder::bind_many_instances`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct BindManyInstances<'b, I> {
    binder: &'b Binder,
    schema: &'b ClassSchema,
    inputs: I,
}

impl<I> Iterator for BindManyInstances<'_, I>
where
    I: Iterator,
    I::Item: Borrow<Record>,
{
    type Item = Result<Instance, BindError>;

    fn next(&mut self) -> Option<Self::Item> {
        let input = self.inputs.next()?;
        Some(self.binder.bind_instance(input.borrow(), self.schema))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inputs.size_hint()
    }
}
