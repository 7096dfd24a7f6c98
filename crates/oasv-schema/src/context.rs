//! # Resolution Context
//!
//! Per-document state shared by every validator compiled from it: the
//! parsed OpenAPI document, the schema engine, and the validator options.
//! A context is built once per document load and is read-only afterwards.
//! [`ResolutionContext::at`] produces a cheap view anchored at one schema
//! node; all sub-schema document paths are seeded from that anchor.

use std::sync::Arc;

use oasv_core::pointer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::SchemaEngine;
use crate::error::SchemaCompileError;

/// Per-document validator options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidatorOptions {
    /// Report every violated constraint instead of the first one.
    pub all_errors: bool,
    /// When coercing, wrap a scalar into a one-element array for array
    /// schemas and unwrap a one-element array for scalar schemas.
    pub coerce_arrays: bool,
    /// Remove undeclared properties where `additionalProperties: false`
    /// instead of reporting them.
    pub strip_additional: bool,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            all_errors: false,
            coerce_arrays: true,
            strip_additional: true,
        }
    }
}

#[derive(Debug)]
struct Shared {
    document: Value,
    engine: SchemaEngine,
    options: ValidatorOptions,
}

/// Read-only resolution state lent to every validator compiler call.
#[derive(Debug, Clone)]
pub struct ResolutionContext {
    shared: Arc<Shared>,
    anchor: String,
}

impl ResolutionContext {
    /// A context over `document` with the default engine, anchored at the
    /// document root.
    pub fn new(document: Value, options: ValidatorOptions) -> Self {
        Self::with_engine(document, SchemaEngine::new(), options)
    }

    /// A context with a caller-configured engine (e.g. custom formats).
    pub fn with_engine(document: Value, engine: SchemaEngine, options: ValidatorOptions) -> Self {
        Self {
            shared: Arc::new(Shared {
                document,
                engine,
                options,
            }),
            anchor: "#".to_string(),
        }
    }

    /// A view of the same document anchored at `anchor`, a document path
    /// such as `#/components/schemas/Pet`.
    pub fn at(&self, anchor: impl Into<String>) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            anchor: anchor.into(),
        }
    }

    /// A view anchored at a child of the current anchor.
    pub fn child<'a>(&self, tokens: impl IntoIterator<Item = &'a str>) -> Self {
        self.at(pointer::extend(&self.anchor, tokens))
    }

    /// The schema anchor.
    pub fn anchor(&self) -> &str {
        &self.anchor
    }

    /// The parsed OpenAPI document.
    pub fn document(&self) -> &Value {
        &self.shared.document
    }

    /// The shared engine.
    pub fn engine(&self) -> &SchemaEngine {
        &self.shared.engine
    }

    /// The document-wide options.
    pub fn options(&self) -> &ValidatorOptions {
        &self.shared.options
    }

    /// The schema node at the anchor.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaCompileError::MissingSchema`] when nothing exists
    /// at the anchor.
    pub fn target(&self) -> Result<&Value, SchemaCompileError> {
        let fragment = self.anchor.strip_prefix('#').unwrap_or(&self.anchor);
        pointer::parse(fragment)?;
        self.document()
            .pointer(fragment)
            .ok_or_else(|| SchemaCompileError::MissingSchema {
                doc_path: self.anchor.clone(),
            })
    }

    /// Resolve a local `$ref` found at `doc_path`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaCompileError::ExternalRef`] for references into
    /// other documents and [`SchemaCompileError::UnresolvedRef`] when the
    /// target does not exist.
    pub fn resolve(&self, reference: &str, doc_path: &str) -> Result<&Value, SchemaCompileError> {
        let fragment = pointer::local_fragment(reference).map_err(|_| SchemaCompileError::ExternalRef {
            reference: reference.to_string(),
        })?;
        self.document()
            .pointer(fragment)
            .ok_or_else(|| SchemaCompileError::UnresolvedRef {
                reference: reference.to_string(),
                doc_path: doc_path.to_string(),
            })
    }
}
