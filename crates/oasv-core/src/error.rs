//! # Error Types
//!
//! Errors raised while handling document paths. Per-call validation
//! failures are *not* errors in this sense: they are returned as data in
//! [`crate::ValidationResult`].

use thiserror::Error;

/// Error while parsing a JSON pointer or a local `$ref`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointerError {
    /// A non-empty pointer must start with `/`.
    #[error("JSON pointer '{0}' must be empty or start with '/'")]
    MissingLeadingSlash(String),

    /// `~` must be followed by `0` or `1`.
    #[error("JSON pointer '{pointer}' has an invalid escape at byte {offset}")]
    InvalidEscape {
        /// The offending pointer.
        pointer: String,
        /// Byte offset of the `~`.
        offset: usize,
    },

    /// The reference points outside the current document.
    #[error("reference '{0}' is not local to the document")]
    NotLocal(String),
}
