//! # formbind-core: Foundational Types for formbind
//!
//! This crate defines the vocabulary every other formbind crate speaks:
//! the dynamic [`Value`] model that untyped input arrives in, the ordered
//! [`Record`] mapping input keys to values, the [`DeclaredType`] tags
//! properties are declared with, [`EnumDescriptor`]s for enumeration
//! types, and the error hierarchy shared by the whole binder.
//!
//! ## Key Design Principles
//!
//! 1. **Input order is data.** `Record` preserves insertion order so that
//!    unconsumed keys are reported in the order the caller supplied them.
//!
//! 2. **Two error kinds, never conflated.** A [`ValidationFailure`] is a
//!    data problem; a [`ConfigurationError`] is a schema or wiring mistake.
//!    Errors raised by user rules travel in [`BindError::Rule`] untouched.
//!
//! 3. **Enums are data, not reflection.** An enum type is an immutable
//!    `EnumDescriptor` built and validated once.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `formbind-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod enums;
pub mod error;
pub mod types;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use enums::{Backing, EnumCase, EnumDescriptor, EnumKind};
pub use error::{
    BindError, Capability, ConfigurationError, LookupError, RuleError, RuleKind, ValidationFailure,
};
pub use types::{DeclaredType, ParseTypeError};
pub use value::{FromValue, HostObject, ObjectRef, Record, Value};
