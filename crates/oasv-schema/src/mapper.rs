//! # Error Mapper
//!
//! Locates raw engine errors in the OpenAPI document. The wrapper prefix
//! `/value` is stripped from the data path and the schema path is walked
//! back through the [`PathTable`](crate::paths::PathTable) to the original
//! document node. The raw error is kept unchanged on `ajv_error`.

use oasv_core::{ErrorLocation, ParameterLocation, RawEngineError, ValidationError};

use crate::context::ResolutionContext;
use crate::transform::TransformedSchema;

const VALUE_PREFIX: &str = "/value";

/// Map raw engine errors into located validation errors, keeping order.
pub fn map_errors(
    raw: Vec<RawEngineError>,
    transformed: &TransformedSchema,
    ctx: &ResolutionContext,
    location: &ParameterLocation,
) -> Vec<ValidationError> {
    raw.into_iter()
        .map(|error| {
            let doc_path = transformed
                .paths
                .doc_path_for(&transformed.schema, &error.schema_path)
                .unwrap_or_else(|| ctx.anchor())
                .to_string();
            let path = instance_path(&error.data_path).to_string();
            ValidationError {
                message: error.message.clone(),
                location: ErrorLocation::new(location, doc_path, path),
                ajv_error: Some(error),
            }
        })
        .collect()
}

/// The error reported for an absent required value.
pub fn missing_required(location: &ParameterLocation) -> ValidationError {
    ValidationError::missing(location)
}

/// Instance path relative to the validated value.
fn instance_path(data_path: &str) -> &str {
    match data_path.strip_prefix(VALUE_PREFIX) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => "",
    }
}
