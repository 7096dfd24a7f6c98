//! # oasv-schema — OpenAPI Schema Validator Compiler
//!
//! Turns a single OpenAPI 3.0 Schema Object into a reusable [`Validator`]
//! with OpenAPI semantics layered over JSON Schema validation.
//!
//! ## Pipeline
//!
//! - [`transform`] rewrites the schema at a [`ResolutionContext`] anchor
//!   into an engine-ready wrapper schema: `readOnly`/`writeOnly`
//!   requiredness relaxed per [`oasv_core::Direction`], `nullable`
//!   expanded, local `$ref` targets copied into `definitions`. A
//!   [`PathTable`] maps every emitted node back to its document path.
//! - [`engine`] compiles the wrapper with the `jsonschema` crate (Draft 4).
//! - [`engine`] also checks bounded numeric formats (`int32`, `int64`)
//!   through a custom keyword, so they hold inside every branch.
//! - The preparation pass coerces request values that did not arrive as
//!   JSON, injects defaults and strips undeclared properties.
//! - [`mapper`] locates engine errors in the original document.
//!
//! ## Entry Points
//!
//! - [`generate_request_validator`]: coerces unless the content type is
//!   JSON; `readOnly` properties are not required.
//! - [`generate_response_validator`]: never coerces; `writeOnly`
//!   properties are not required.
//!
//! ## Crate Policy
//!
//! - Depends only on `oasv-core` internally.
//! - Setup problems (unresolved `$ref`, malformed schema) are
//!   [`SchemaCompileError`]s raised at generation time. Per-call outcomes
//!   are always a [`oasv_core::ValidationResult`], never an `Err`.
//! - The document is never mutated; the only mutation a validator performs
//!   is on the value it is given.

mod coerce;
pub mod context;
pub mod engine;
pub mod error;
mod formats;
pub mod mapper;
pub mod model;
pub mod paths;
mod prepare;
pub mod transform;
pub mod validator;

pub use context::{ResolutionContext, ValidatorOptions};
pub use engine::{CompiledSchema, FormatCheck, SchemaEngine};
pub use error::SchemaCompileError;
pub use model::{AdditionalProperties, Reference, Schema, SchemaOrRef, SchemaType};
pub use paths::PathTable;
pub use transform::{transform, TransformedSchema};
pub use validator::{generate_request_validator, generate_response_validator, Validator};
