//! # formbind-schema: Declarative Binding Schemas
//!
//! Describes what the binder binds to. A [`ClassSchema`] lists a target's
//! properties in declaration order, each with its input key, declared
//! type, default, and attached rules; a [`TypeCatalog`] resolves the named
//! types those properties refer to.
//!
//! ## Schema Sources
//!
//! - **In code**: [`ClassSchema::builder`] and [`PropertySchema::typed`] /
//!   [`PropertySchema::untyped`], usually inside a [`Bindable::schema`]
//!   implementation.
//! - **As data**: a [`SchemaDocument`] loaded from YAML or JSON (see the
//!   [`document`] module).
//!
//! ## Rules (`rules`)
//!
//! A property has at most one [`TransformRule`] and any number of
//! [`ValidationRule`]s, each inline or a reference to a named service.
//! Arbitrary [`RuleAttribute`] objects are classified into these variants
//! when the property is built.
//!
//! ## Caching (`cache`)
//!
//! [`SchemaCache`] derives each `Bindable` type's schema once and shares it.
//!
//! ## Crate Policy
//!
//! - Depends only on `formbind-core` internally.
//! - A schema that builds is internally consistent; the binder never
//!   re-validates it.

pub mod arguments;
pub mod cache;
pub mod catalog;
pub mod document;
pub mod rules;
pub mod schema;
pub mod target;

pub use arguments::{Argument, Arguments};
pub use cache::SchemaCache;
pub use catalog::{ObjectKind, ResolvedType, TypeCatalog};
pub use document::{DocumentError, SchemaDocument};
pub use rules::{
    InlineTransform, InlineValidate, RuleAttribute, ServiceRef, TransformRule, ValidationRule,
};
pub use schema::{ClassSchema, ClassSchemaBuilder, PropertyBuilder, PropertySchema};
pub use target::{Bindable, Instance};
