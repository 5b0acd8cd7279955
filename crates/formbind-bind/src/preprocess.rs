//! # Pre-Processing Pipeline
//!
//! Applies a schema's pre-processor services to the whole input, in
//! declaration order, each one receiving the previous one's output. The
//! caller's record is never modified: it is copied only when the first
//! pre-processor runs, and borrowed unchanged when there are none.

use std::borrow::Cow;

use formbind_core::{BindError, Capability, Record};
use formbind_schema::ClassSchema;

use crate::service::{missing, ServiceLocator};

/// Run the pre-processors of `schema` over `input`.
///
/// # Errors
///
/// - `BindError::Lookup` if a service name does not resolve.
/// - `BindError::Configuration` if a service is not a pre-processor.
/// - `BindError::Rule` with whatever a pre-processor raised.
pub fn pre_process<'a>(
    input: &'a Record,
    schema: &ClassSchema,
    locator: &dyn ServiceLocator,
) -> Result<Cow<'a, Record>, BindError> {
    let mut current = Cow::Borrowed(input);
    for name in schema.pre_processors() {
        let service = locator.resolve(name)?;
        let pre_processor = service
            .as_pre_processor()
            .ok_or_else(|| missing(name, Capability::PreProcessor))?;
        let processed = pre_processor
            .process(current.into_owned())
            .map_err(BindError::Rule)?;
        tracing::trace!(service = %name, keys = processed.len(), "pre-processed input");
        current = Cow::Owned(processed);
    }
    Ok(current)
}
