//! # Validation Results
//!
//! The per-call outcome of a compiled validator. Validation never fails
//! with a Rust error: every violation is data, and `errors` is the only
//! success signal.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::location::{ParameterIn, ParameterLocation};

/// A failure as reported by the underlying schema engine, before it is
/// located in the OpenAPI document.
///
/// Kept verbatim on [`ValidationError::ajv_error`] for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEngineError {
    /// JSON pointer into the internal wrapper instance (`/value/...`).
    pub data_path: String,
    /// The schema keyword that failed (`type`, `required`, `format`, ...).
    pub keyword: String,
    /// The engine's human-readable message.
    pub message: String,
    /// Keyword-specific details.
    pub params: Value,
    /// JSON pointer into the internal wrapper schema.
    pub schema_path: String,
}

/// Where a failure was found: the parameter slot, the schema node in the
/// document, and the position inside the validated value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLocation {
    /// The slot the value was read from.
    #[serde(rename = "in")]
    pub location: ParameterIn,
    /// Parameter name, or `"body"`.
    pub name: String,
    /// Document path of the most specific schema node implicated.
    #[serde(rename = "docPath")]
    pub doc_path: String,
    /// Instance path relative to the validated value; `""` at the root.
    pub path: String,
}

impl ErrorLocation {
    /// Locate a failure at `path`, implicating the schema node at `doc_path`.
    pub fn new(parameter: &ParameterLocation, doc_path: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            location: parameter.location,
            name: parameter.name.clone(),
            doc_path: doc_path.into(),
            path: path.into(),
        }
    }
}

/// A single located violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Human-readable description.
    pub message: String,
    /// Where the violation was found.
    pub location: ErrorLocation,
    /// The engine error this was derived from. Absent only for the
    /// synthetic "missing required" error.
    #[serde(rename = "ajvError", skip_serializing_if = "Option::is_none", default)]
    pub ajv_error: Option<RawEngineError>,
}

impl ValidationError {
    /// The error reported when a required value is wholly absent.
    pub fn missing(parameter: &ParameterLocation) -> Self {
        Self {
            message: parameter.missing_message(),
            location: ErrorLocation::new(parameter, parameter.doc_path.clone(), ""),
            ajv_error: None,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.path.is_empty() {
            write!(f, "{} {}: {}", self.location.location, self.location.name, self.message)
        } else {
            write!(
                f,
                "{} {} at {}: {}",
                self.location.location, self.location.name, self.location.path, self.message
            )
        }
    }
}

/// Outcome of one validator call.
///
/// `errors` is `None` exactly when `value` satisfies the schema. `value`
/// always carries coercion, default and stripping side effects, even when
/// unrelated properties failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Every violation found, bounded by the `all_errors` policy.
    pub errors: Option<Vec<ValidationError>>,
    /// The canonical value; `None` when the input was absent.
    pub value: Option<Value>,
}

impl ValidationResult {
    /// A successful outcome.
    pub fn valid(value: Option<Value>) -> Self {
        Self { errors: None, value }
    }

    /// A failed outcome. An empty error list is normalized to success.
    pub fn invalid(errors: Vec<ValidationError>, value: Option<Value>) -> Self {
        Self {
            errors: if errors.is_empty() { None } else { Some(errors) },
            value,
        }
    }

    /// True when no violation was found.
    pub fn is_valid(&self) -> bool {
        self.errors.is_none()
    }

    /// The violations found, or an empty slice.
    pub fn errors(&self) -> &[ValidationError] {
        self.errors.as_deref().unwrap_or_default()
    }

    /// Split into a `Result`, keeping the value on both sides.
    pub fn into_result(self) -> Result<Option<Value>, (Vec<ValidationError>, Option<Value>)> {
        match self.errors {
            None => Ok(self.value),
            Some(errors) => Err((errors, self.value)),
        }
    }
}
