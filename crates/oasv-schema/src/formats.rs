//! # Numeric Formats
//!
//! OpenAPI attaches `format` to numbers as well as strings. JSON Schema
//! engines only assert formats on strings, so the transformer emits a
//! companion keyword for bounded numeric formats and the engine checks it
//! like any other keyword. Failures are reported with keyword `format`.

use serde_json::Number;

/// A numeric `format` understood by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericFormat {
    /// Signed 32-bit integer range.
    Int32,
    /// Signed 64-bit integer range.
    Int64,
    /// Single precision; no bound beyond the base type.
    Float,
    /// Double precision; no bound beyond the base type.
    Double,
}

impl NumericFormat {
    /// Look up a format by name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int32" => Some(Self::Int32),
            "int64" => Some(Self::Int64),
            "float" => Some(Self::Float),
            "double" => Some(Self::Double),
            _ => None,
        }
    }

    /// The format name as written in a schema.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float => "float",
            Self::Double => "double",
        }
    }

    /// True when the format restricts the range of its base type.
    pub fn is_bounded(&self) -> bool {
        matches!(self, Self::Int32 | Self::Int64)
    }

    /// True when `n` lies within the format's range.
    pub fn accepts(&self, n: &Number) -> bool {
        match self {
            Self::Int32 => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => i32::try_from(i).is_ok(),
                (None, Some(f)) => (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(&f),
                (None, None) => false,
            },
            Self::Int64 => match (n.as_i64(), n.as_u64(), n.as_f64()) {
                (Some(_), _, _) => true,
                (None, Some(_), _) => false,
                // i64::MAX rounds up to 2^63 as f64, so the upper bound is exclusive
                (None, None, Some(f)) => f >= i64::MIN as f64 && f < i64::MAX as f64,
                (None, None, None) => false,
            },
            Self::Float | Self::Double => true,
        }
    }

    /// Engine-style message for a value outside the range.
    pub fn message(&self) -> String {
        format!("must match format \"{}\"", self.name())
    }
}
