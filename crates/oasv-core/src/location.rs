//! # Parameter Locations
//!
//! Identifies where a validated value lives in the API surface. Locations
//! are constructed by the caller once per parameter or body slot and are
//! copied into every error the compiled validator reports.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The slot a value is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterIn {
    /// Query string parameter.
    Query,
    /// Request or response header.
    Header,
    /// Templated path segment.
    Path,
    /// Cookie value.
    Cookie,
    /// Request body.
    Request,
    /// Response body.
    Response,
}

impl ParameterIn {
    /// The lowercase name used in messages and serialized locations.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Header => "header",
            Self::Path => "path",
            Self::Cookie => "cookie",
            Self::Request => "request",
            Self::Response => "response",
        }
    }

    /// True for request and response bodies.
    pub fn is_body(&self) -> bool {
        matches!(self, Self::Request | Self::Response)
    }
}

impl fmt::Display for ParameterIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a value originates and where its schema lives in the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterLocation {
    /// The slot the value is read from.
    #[serde(rename = "in")]
    pub location: ParameterIn,
    /// Parameter name, or `"body"` for bodies.
    pub name: String,
    /// Document path of the parameter or media type object.
    #[serde(rename = "docPath")]
    pub doc_path: String,
}

impl ParameterLocation {
    /// Build a location from its parts.
    pub fn new(location: ParameterIn, name: impl Into<String>, doc_path: impl Into<String>) -> Self {
        Self {
            location,
            name: name.into(),
            doc_path: doc_path.into(),
        }
    }

    /// A query string parameter.
    pub fn query(name: impl Into<String>, doc_path: impl Into<String>) -> Self {
        Self::new(ParameterIn::Query, name, doc_path)
    }

    /// A header parameter.
    pub fn header(name: impl Into<String>, doc_path: impl Into<String>) -> Self {
        Self::new(ParameterIn::Header, name, doc_path)
    }

    /// A path parameter.
    pub fn path(name: impl Into<String>, doc_path: impl Into<String>) -> Self {
        Self::new(ParameterIn::Path, name, doc_path)
    }

    /// A cookie parameter.
    pub fn cookie(name: impl Into<String>, doc_path: impl Into<String>) -> Self {
        Self::new(ParameterIn::Cookie, name, doc_path)
    }

    /// The request body.
    pub fn request_body(doc_path: impl Into<String>) -> Self {
        Self::new(ParameterIn::Request, "body", doc_path)
    }

    /// A response body.
    pub fn response_body(doc_path: impl Into<String>) -> Self {
        Self::new(ParameterIn::Response, "body", doc_path)
    }

    /// Message reported when a required value is wholly absent.
    pub fn missing_message(&self) -> String {
        if self.location.is_body() {
            format!("Missing required {} body", self.location)
        } else {
            format!(
                "Missing required {} parameter \"{}\"",
                self.location, self.name
            )
        }
    }
}

/// Which side of an exchange a validator checks.
///
/// Requests drop `readOnly` properties from `required` and may coerce
/// primitive types; responses drop `writeOnly` properties from `required`
/// and never coerce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Client to server.
    Request,
    /// Server to client.
    Response,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request => f.write_str("request"),
            Self::Response => f.write_str("response"),
        }
    }
}
