//! # Compile Errors
//!
//! Setup-time failures raised while generating a validator. These are
//! schema authoring errors: they surface before any request is processed
//! and are never part of a per-call [`oasv_core::ValidationResult`].

use oasv_core::PointerError;
use thiserror::Error;

/// Error while compiling a schema into a validator.
#[derive(Error, Debug)]
pub enum SchemaCompileError {
    /// No node exists at the schema anchor.
    #[error("no schema found at '{doc_path}'")]
    MissingSchema {
        /// The anchor that was looked up.
        doc_path: String,
    },

    /// A local `$ref` does not resolve inside the document.
    #[error("unresolved reference '{reference}' at '{doc_path}'")]
    UnresolvedRef {
        /// The `$ref` value.
        reference: String,
        /// Document path of the node carrying the `$ref`.
        doc_path: String,
    },

    /// A `$ref` points into another document.
    #[error("external reference '{reference}' cannot be resolved")]
    ExternalRef {
        /// The `$ref` value.
        reference: String,
    },

    /// The node is not a well-formed Schema Object.
    #[error("invalid schema at '{doc_path}': {reason}")]
    InvalidSchema {
        /// Document path of the malformed node.
        doc_path: String,
        /// Why it could not be read.
        reason: String,
    },

    /// The validation engine rejected the rewritten schema.
    #[error("validator build error for schema '{doc_path}': {reason}")]
    EngineBuild {
        /// The schema anchor being compiled.
        doc_path: String,
        /// The engine's reason.
        reason: String,
    },

    /// A document path could not be parsed.
    #[error("invalid document path: {0}")]
    Pointer(#[from] PointerError),
}
