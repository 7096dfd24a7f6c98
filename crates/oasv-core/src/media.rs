//! # Media Types
//!
//! Content-type classification used to decide whether request values may
//! be coerced. Structured JSON bodies carry real types and are validated
//! as-is; everything else (form bodies, query strings, headers, path
//! segments) arrives as text and is coerced toward the declared type.

/// Coarse classification of a request content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// `application/json` or any `+json` structured syntax suffix.
    Json,
    /// Anything else, including form encodings and plain text.
    Text,
}

impl MediaKind {
    /// Classify a raw `Content-Type` value. Parameters and case are ignored.
    pub fn of(content_type: &str) -> Self {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if essence == "application/json" || essence.ends_with("+json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// True when `content_type` denotes a structured JSON body.
pub fn is_json_media_type(content_type: &str) -> bool {
    MediaKind::of(content_type) == MediaKind::Json
}
