//! # oasv-core — Shared Vocabulary for OpenAPI Value Validation
//!
//! This crate defines the small data types that sit between an HTTP layer
//! and the validator compiler in `oasv-schema`. It knows nothing about
//! JSON Schema engines; it only describes *where* a value came from and
//! *how* a failure is reported back.
//!
//! ## Key Types
//!
//! - [`ParameterLocation`]: where a value originates in the API surface
//!   (`query`, `header`, `path`, `cookie`, request or response body) and
//!   where its schema lives in the document.
//! - [`Direction`]: request validators relax `readOnly` requiredness and
//!   may coerce; response validators relax `writeOnly` and never coerce.
//! - [`ValidationResult`] / [`ValidationError`]: the per-call outcome.
//!   `errors` is `None` exactly when the value satisfied its schema.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `oasv-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.

pub mod error;
pub mod location;
pub mod media;
pub mod pointer;
pub mod result;

pub use error::PointerError;
pub use location::{Direction, ParameterIn, ParameterLocation};
pub use media::{is_json_media_type, MediaKind};
pub use result::{ErrorLocation, RawEngineError, ValidationError, ValidationResult};
