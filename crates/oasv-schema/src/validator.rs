//! # Validator Compiler
//!
//! Builds a [`Validator`] for one (schema, location, direction, content
//! type) combination. The validator is compiled once and reused; it holds
//! no per-call state, so one instance may serve concurrent requests. The
//! only mutation a call performs is on its own input value.
//!
//! ## Call Pipeline
//!
//! 1. An absent value short-circuits: optional → valid, required → one
//!    synthetic "missing" error. The engine is not invoked.
//! 2. The value is wrapped as `{"value": ...}` and prepared (coercion,
//!    defaults, stripping).
//! 3. The engine checks the prepared instance. Errors come in schema
//!    declaration order; without `all_errors` only the first is kept.
//! 4. Each error is located in the document.

use oasv_core::{is_json_media_type, Direction, ParameterLocation, ValidationError, ValidationResult};
use serde_json::{json, Value};

use crate::context::ResolutionContext;
use crate::engine::CompiledSchema;
use crate::error::SchemaCompileError;
use crate::mapper::{map_errors, missing_required};
use crate::paths::PathTable;
use crate::prepare::{Coercion, Preparer};
use crate::transform::{transform, TransformedSchema};

/// Compile a validator for a request parameter or body.
///
/// Coercion is enabled unless `content_type` is a JSON media type.
///
/// # Errors
///
/// Returns [`SchemaCompileError`] when the schema at `ctx`'s anchor cannot
/// be transformed or compiled.
pub fn generate_request_validator(
    ctx: &ResolutionContext,
    location: ParameterLocation,
    required: bool,
    content_type: &str,
) -> Result<Validator, SchemaCompileError> {
    let coercion = (!is_json_media_type(content_type)).then(|| Coercion {
        arrays: ctx.options().coerce_arrays,
    });
    Validator::compile(ctx, location, required, Direction::Request, coercion)
}

/// Compile a validator for a response body. Responses are never coerced.
///
/// # Errors
///
/// Returns [`SchemaCompileError`] when the schema at `ctx`'s anchor cannot
/// be transformed or compiled.
pub fn generate_response_validator(
    ctx: &ResolutionContext,
    location: ParameterLocation,
    required: bool,
) -> Result<Validator, SchemaCompileError> {
    Validator::compile(ctx, location, required, Direction::Response, None)
}

/// A compiled, reusable value validator.
#[derive(Debug)]
pub struct Validator {
    compiled: CompiledSchema,
    transformed: TransformedSchema,
    context: ResolutionContext,
    location: ParameterLocation,
    required: bool,
    direction: Direction,
    coercion: Option<Coercion>,
}

impl Validator {
    fn compile(
        ctx: &ResolutionContext,
        location: ParameterLocation,
        required: bool,
        direction: Direction,
        coercion: Option<Coercion>,
    ) -> Result<Self, SchemaCompileError> {
        let transformed = transform(ctx, direction, required)?;
        let compiled = ctx
            .engine()
            .compile(&transformed.schema)
            .map_err(|reason| SchemaCompileError::EngineBuild {
                doc_path: ctx.anchor().to_string(),
                reason,
            })?;

        tracing::debug!(
            doc_path = ctx.anchor(),
            location = %location.location,
            name = %location.name,
            %direction,
            coerce = coercion.is_some(),
            definitions = transformed.definitions,
            "compiled validator"
        );

        Ok(Self {
            compiled,
            transformed,
            context: ctx.clone(),
            location,
            required,
            direction,
            coercion,
        })
    }

    /// Validate a value. `None` means the value was absent.
    ///
    /// The returned value carries coercion, defaults and stripping even
    /// when errors are reported.
    pub fn validate(&self, value: Option<Value>) -> ValidationResult {
        let Some(value) = value else {
            return self.absent();
        };
        let mut instance = json!({ "value": value });
        let errors = self.run(&mut instance);
        let value = instance.get_mut("value").map(Value::take);
        ValidationResult::invalid(errors, value)
    }

    /// Validate a present value, rewriting it in place. Returns `None`
    /// when the value is valid.
    pub fn validate_in_place(&self, value: &mut Value) -> Option<Vec<ValidationError>> {
        let mut instance = json!({ "value": value.take() });
        let errors = self.run(&mut instance);
        if let Some(prepared) = instance.get_mut("value") {
            *value = prepared.take();
        }
        if errors.is_empty() {
            None
        } else {
            Some(errors)
        }
    }

    fn absent(&self) -> ValidationResult {
        tracing::trace!(
            location = %self.location.location,
            name = %self.location.name,
            required = self.required,
            "value absent"
        );
        if self.required {
            ValidationResult::invalid(vec![missing_required(&self.location)], None)
        } else {
            ValidationResult::valid(None)
        }
    }

    fn run(&self, instance: &mut Value) -> Vec<ValidationError> {
        let options = self.context.options();
        Preparer::new(self.compiled.schema(), self.coercion, options.strip_additional).run(instance);

        let raw = self.compiled.check(instance, options.all_errors);
        let errors = map_errors(raw, &self.transformed, &self.context, &self.location);
        tracing::trace!(
            location = %self.location.location,
            name = %self.location.name,
            errors = errors.len(),
            "validated value"
        );
        errors
    }

    /// The slot this validator checks.
    pub fn location(&self) -> &ParameterLocation {
        &self.location
    }

    /// Whether an absent value is an error.
    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Whether primitive coercion is applied.
    pub fn coerces(&self) -> bool {
        self.coercion.is_some()
    }

    /// Document path of the compiled schema.
    pub fn doc_path(&self) -> &str {
        self.context.anchor()
    }

    /// The internal wrapper schema handed to the engine.
    pub fn schema(&self) -> &Value {
        &self.transformed.schema
    }

    pub fn paths(&self) -> &PathTable {
        &self.transformed.paths
    }
}
