//! # formbind-bind: The Binder
//!
//! Turns an untyped [`Record`](formbind_core::Record) into a fully
//! populated, type-checked and validated instance of a
//! [`ClassSchema`](formbind_schema::ClassSchema), or into exactly one
//! precise failure.
//!
//! ## Pipeline
//!
//! ```text
//! raw input ─▶ pre-processors ─▶ per property, in declaration order:
//!                                  key ─▶ value/default ─▶ transform
//!                                  ─▶ coerce ─▶ validate ─▶ assign
//!                              ─▶ extra-key check ─▶ instance
//! ```
//!
//! - [`preprocess`]: whole-input pre-processor services.
//! - [`builder`]: the per-property state machine and extra-key check.
//! - [`coerce`]: declared-type coercion, including enum matching.
//! - [`invoke`]: transform and validation rule invocation.
//! - [`service`]: service capabilities, the locator seam, and an
//!   in-memory [`ServiceRegistry`].
//!
//! ## Errors
//!
//! Every operation returns [`BindError`](formbind_core::BindError).
//! Validation failures and configuration errors are distinct variants;
//! errors raised by rules and services pass through untouched.
//!
//! ## Crate Policy
//!
//! - Synchronous and single-pass; the only shared state is the schema
//!   cache.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod binder;
pub mod builder;
pub mod coerce;
pub mod invoke;
pub mod preprocess;
pub mod service;

pub use binder::{BindMany, BindManyInstances, Binder};
pub use builder::ObjectBuilder;
pub use coerce::{parse_int_strict, Coercion};
pub use preprocess::pre_process;
pub use service::{
    capabilities, PreProcessor, Service, ServiceLocator, ServiceRegistry, Transformer, Validator,
};
