//! # Validation Engine
//!
//! Adapter over the `jsonschema` crate. The engine receives the rewritten
//! wrapper schema (Draft 4 semantics, which match OpenAPI 3.0's boolean
//! `exclusiveMinimum`/`exclusiveMaximum`) and reports failures as
//! [`RawEngineError`] records in the engine-neutral shape the error
//! mapper consumes.
//!
//! Bounded numeric formats (`int32`, `int64`) are checked by a custom
//! keyword, [`NUMERIC_FORMAT_KEYWORD`], which the transformer emits next to
//! `format`. Its failures are reported as keyword `format`, so they are
//! indistinguishable from string format failures and are found inside
//! `oneOf`/`anyOf`/`not` branches like any other keyword.
//!
//! ## Thread Safety
//!
//! [`SchemaEngine`] is `Send + Sync` and shared by every validator
//! compiled from one [`crate::ResolutionContext`]. Compilation reads it
//! only; each [`CompiledSchema`] is independent of every other.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use jsonschema::error::ValidationErrorKind;
use jsonschema::paths::{LazyLocation, Location};
use jsonschema::{Keyword, Retrieve, Uri, ValidationError, Validator};
use oasv_core::{pointer, RawEngineError};
use serde_json::{json, Map, Value};

use crate::formats::NumericFormat;
use crate::paths;

/// Keyword carrying a bounded numeric format in wrapper schemas.
pub const NUMERIC_FORMAT_KEYWORD: &str = "x-oasv-numeric-format";

/// A custom string format predicate.
pub type FormatCheck = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Retriever that refuses every remote reference.
///
/// Wrapper schemas only carry `#/definitions/...` references; anything
/// else would be a network request and is rejected at build time.
struct LocalOnlyRetriever;

impl Retrieve for LocalOnlyRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("remote schema '{}' cannot be retrieved", uri.as_str()).into())
    }
}

/// Range check for one numeric format. Non-numbers pass; `type` owns them.
struct NumericFormatKeyword {
    format: NumericFormat,
    location: Location,
}

impl Keyword for NumericFormatKeyword {
    fn validate<'i>(&self, instance: &'i Value, location: &LazyLocation) -> Result<(), ValidationError<'i>> {
        if self.is_valid(instance) {
            Ok(())
        } else {
            Err(ValidationError::custom(
                self.location.clone(),
                location.into(),
                instance,
                self.format.message(),
            ))
        }
    }

    fn is_valid(&self, instance: &Value) -> bool {
        match instance {
            Value::Number(n) => self.format.accepts(n),
            _ => true,
        }
    }
}

fn numeric_format_keyword<'a>(
    _parent: &'a Map<String, Value>,
    value: &'a Value,
    location: Location,
) -> Result<Box<dyn Keyword>, ValidationError<'a>> {
    match value.as_str().and_then(NumericFormat::from_name) {
        Some(format) => Ok(Box::new(NumericFormatKeyword { format, location })),
        None => Err(ValidationError::custom(
            location,
            Location::new(),
            value,
            format!("unknown numeric format {value}"),
        )),
    }
}

/// The shared schema-validation engine.
#[derive(Clone, Default)]
pub struct SchemaEngine {
    formats: BTreeMap<String, FormatCheck>,
}

impl fmt::Debug for SchemaEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaEngine")
            .field("formats", &self.formats.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SchemaEngine {
    /// An engine with the built-in formats only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom string format.
    pub fn with_format<F>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.formats.insert(name.into(), Arc::new(check));
        self
    }

    /// Names of the registered custom formats.
    pub fn format_names(&self) -> impl Iterator<Item = &str> {
        self.formats.keys().map(String::as_str)
    }

    /// Compile a wrapper schema.
    ///
    /// # Errors
    ///
    /// Returns the engine's reason when the schema is rejected.
    pub fn compile(&self, schema: &Value) -> Result<CompiledSchema, String> {
        let mut options = jsonschema::options();
        options.with_draft(jsonschema::Draft::Draft4);
        options.should_validate_formats(true);
        options.with_retriever(LocalOnlyRetriever);
        options.with_keyword(NUMERIC_FORMAT_KEYWORD, numeric_format_keyword);
        for (name, check) in &self.formats {
            let check = Arc::clone(check);
            options.with_format(name.clone(), move |s: &str| (*check)(s));
        }

        let validator = options.build(schema).map_err(|e| e.to_string())?;
        Ok(CompiledSchema {
            validator,
            schema: schema.clone(),
        })
    }
}

/// A compiled wrapper schema. Holds no per-call state.
pub struct CompiledSchema {
    validator: Validator,
    schema: Value,
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl CompiledSchema {
    /// The wrapper schema this was compiled from.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Check `instance`, returning at most one error unless `all_errors`.
    pub fn check(&self, instance: &Value, all_errors: bool) -> Vec<RawEngineError> {
        let limit = if all_errors { usize::MAX } else { 1 };
        self.validator
            .iter_errors(instance)
            .take(limit)
            .map(|e| self.raw_error(&e))
            .collect()
    }

    fn raw_error(&self, error: &jsonschema::ValidationError<'_>) -> RawEngineError {
        let mut schema_path = error.schema_path.to_string();
        let mut keyword = pointer::parse(&schema_path)
            .ok()
            .and_then(|mut tokens| tokens.pop())
            .unwrap_or_default();

        let params = match &error.kind {
            ValidationErrorKind::Required { property, .. } => json!({ "missingProperty": property }),
            ValidationErrorKind::Format { format, .. } => json!({ "format": format }),
            ValidationErrorKind::Custom { .. } if keyword == NUMERIC_FORMAT_KEYWORD => {
                let format = self
                    .keyword_params(&keyword, &schema_path)
                    .get(NUMERIC_FORMAT_KEYWORD)
                    .cloned()
                    .unwrap_or(Value::Null);
                if let Some(parent) = schema_path.strip_suffix(NUMERIC_FORMAT_KEYWORD) {
                    schema_path = format!("{parent}format");
                }
                keyword = "format".to_string();
                json!({ "format": format })
            }
            _ => self.keyword_params(&keyword, &schema_path),
        };

        RawEngineError {
            data_path: error.instance_path.to_string(),
            keyword,
            message: error.to_string(),
            params,
            schema_path,
        }
    }

    fn keyword_params(&self, keyword: &str, schema_path: &str) -> Value {
        let tokens = paths::canonical_tokens(&self.schema, schema_path);
        let internal = pointer::extend("", tokens.iter().map(String::as_str));
        match self.schema.pointer(&internal) {
            Some(value) => {
                let mut params = Map::new();
                params.insert(keyword.to_string(), value.clone());
                Value::Object(params)
            }
            None => Value::Object(Map::new()),
        }
    }
}
