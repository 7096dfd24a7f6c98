//! # Schema Transformer
//!
//! Rewrites the OpenAPI schema at the context anchor into a wrapper schema
//! the engine can compile:
//!
//! ```json
//! { "type": "object",
//!   "properties": { "value": <rewritten target> },
//!   "required": ["value"],
//!   "definitions": { "Pet": <rewritten #/components/schemas/Pet>, ... } }
//! ```
//!
//! Wrapping the target under `value` lets root-level coercion, defaulting
//! and error paths work exactly like nested ones.
//!
//! ## Rewrites
//!
//! - `required` loses every property whose schema (through `$ref`) is
//!   `readOnly` for requests or `writeOnly` for responses. Property
//!   definitions are kept.
//! - `nullable: true` becomes `type: [T, "null"]` (plus `null` in `enum`).
//!   A nullable composite becomes `anyOf: [{type: null}, <node>]` so
//!   `allOf`/`oneOf` branches cannot reject `null`.
//! - Each `$ref` target is rewritten once into `definitions`, so
//!   recursive schemas compile and nullability travels with the target.
//! - OpenAPI-only keywords are dropped.
//!
//! The original document is never mutated; every node is rebuilt.

use std::collections::{HashMap, HashSet};

use oasv_core::{pointer, Direction};
use serde_json::{json, Map, Value};

use crate::context::ResolutionContext;
use crate::engine::NUMERIC_FORMAT_KEYWORD;
use crate::error::SchemaCompileError;
use crate::formats::NumericFormat;
use crate::model::{self, AdditionalProperties, Schema, SchemaOrRef};
use crate::paths::{PathTable, MAX_REF_HOPS};

/// Internal pointer of the wrapped target schema.
pub const VALUE_POINTER: &str = "/properties/value";

/// A rewritten wrapper schema and its path rewrite table.
#[derive(Debug, Clone)]
pub struct TransformedSchema {
    /// The wrapper schema handed to the engine.
    pub schema: Value,
    /// Internal pointer → original document path.
    pub paths: PathTable,
    /// Number of `$ref` targets copied into `definitions`.
    pub definitions: usize,
}

/// Rewrite the schema at `ctx`'s anchor for `direction`.
///
/// # Errors
///
/// Returns [`SchemaCompileError`] when the anchor or a `$ref` does not
/// resolve, or a node is not a well-formed Schema Object.
pub fn transform(
    ctx: &ResolutionContext,
    direction: Direction,
    required: bool,
) -> Result<TransformedSchema, SchemaCompileError> {
    let anchor = ctx.anchor();
    let target = read_schema(ctx.target()?, anchor)?;

    let mut rewriter = Rewriter {
        ctx,
        direction,
        definitions: Map::new(),
        definition_keys: HashMap::new(),
        used_keys: HashSet::new(),
        paths: PathTable::default(),
    };
    let value = rewriter.node(&target, VALUE_POINTER, anchor)?;

    let mut wrapper = Map::new();
    wrapper.insert("type".into(), json!("object"));
    wrapper.insert("properties".into(), json!({ "value": value }));
    if required {
        wrapper.insert("required".into(), json!(["value"]));
    }
    let definitions = rewriter.definitions.len();
    if definitions > 0 {
        wrapper.insert("definitions".into(), Value::Object(rewriter.definitions));
    }

    Ok(TransformedSchema {
        schema: Value::Object(wrapper),
        paths: rewriter.paths,
        definitions,
    })
}

fn read_schema(raw: &Value, doc_path: &str) -> Result<SchemaOrRef, SchemaCompileError> {
    for at in model::ref_siblings(raw, doc_path) {
        tracing::warn!(doc_path = %at, "keywords beside $ref are ignored");
    }
    SchemaOrRef::from_value(raw).map_err(|e| SchemaCompileError::InvalidSchema {
        doc_path: doc_path.to_string(),
        reason: e.to_string(),
    })
}

struct Rewriter<'a> {
    ctx: &'a ResolutionContext,
    direction: Direction,
    definitions: Map<String, Value>,
    /// `$ref` string → key under `definitions`.
    definition_keys: HashMap<String, String>,
    used_keys: HashSet<String>,
    paths: PathTable,
}

impl Rewriter<'_> {
    fn node(&mut self, node: &SchemaOrRef, internal: &str, doc_path: &str) -> Result<Value, SchemaCompileError> {
        match node {
            SchemaOrRef::Ref(r) => {
                self.paths.insert(internal, doc_path);
                self.reference(&r.reference, doc_path)
            }
            SchemaOrRef::Schema(schema) => self.schema(schema, internal, doc_path),
        }
    }

    fn reference(&mut self, reference: &str, doc_path: &str) -> Result<Value, SchemaCompileError> {
        if let Some(key) = self.definition_keys.get(reference) {
            return Ok(definition_ref(key));
        }

        let raw = self.ctx.resolve(reference, doc_path)?;
        let target = read_schema(raw, reference)?;
        let key = self.definition_key(reference);
        self.definition_keys.insert(reference.to_string(), key.clone());

        let internal = pointer::push("/definitions", &key);
        let rewritten = self.node(&target, &internal, reference)?;
        self.definitions.insert(key.clone(), rewritten);
        Ok(definition_ref(&key))
    }

    /// A readable, URI-safe key derived from the reference's last token.
    fn definition_key(&mut self, reference: &str) -> String {
        let last = reference.rsplit('/').next().unwrap_or_default();
        let mut base: String = last
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.' { c } else { '_' })
            .collect();
        if base.is_empty() {
            base = "schema".to_string();
        }
        let mut key = base.clone();
        let mut n = 2;
        while !self.used_keys.insert(key.clone()) {
            key = format!("{base}_{n}");
            n += 1;
        }
        key
    }

    fn schema(&mut self, s: &Schema, internal: &str, doc_path: &str) -> Result<Value, SchemaCompileError> {
        let wrap_nullable = s.nullable && s.is_composite();
        let base = if wrap_nullable {
            self.paths.insert(internal, doc_path);
            pointer::extend(internal, ["anyOf", "1"])
        } else {
            internal.to_string()
        };
        self.paths.insert(base.as_str(), doc_path);
        let inline_null = s.nullable && !wrap_nullable;

        let mut out = Map::new();
        if let Some(t) = s.schema_type {
            if inline_null {
                out.insert("type".into(), json!([t.as_str(), "null"]));
            } else {
                out.insert("type".into(), json!(t.as_str()));
            }
        }
        if let Some(values) = s.enumeration.as_ref().filter(|v| !v.is_empty()) {
            let mut values = values.clone();
            if inline_null && !values.contains(&Value::Null) {
                values.push(Value::Null);
            }
            out.insert("enum".into(), Value::Array(values));
        }
        if let Some(format) = &s.format {
            out.insert("format".into(), json!(format));
            if NumericFormat::from_name(format).is_some_and(|f| f.is_bounded()) {
                out.insert(NUMERIC_FORMAT_KEYWORD.into(), json!(format));
            }
        }

        insert_number(&mut out, "multipleOf", &s.multiple_of);
        insert_number(&mut out, "maximum", &s.maximum);
        if s.exclusive_maximum && s.maximum.is_some() {
            out.insert("exclusiveMaximum".into(), json!(true));
        }
        insert_number(&mut out, "minimum", &s.minimum);
        if s.exclusive_minimum && s.minimum.is_some() {
            out.insert("exclusiveMinimum".into(), json!(true));
        }

        insert_count(&mut out, "maxLength", s.max_length);
        insert_count(&mut out, "minLength", s.min_length);
        if let Some(pattern) = &s.pattern {
            out.insert("pattern".into(), json!(pattern));
        }

        if let Some(items) = &s.items {
            let v = self.node(items, &pointer::push(&base, "items"), &pointer::push(doc_path, "items"))?;
            out.insert("items".into(), v);
        }
        insert_count(&mut out, "maxItems", s.max_items);
        insert_count(&mut out, "minItems", s.min_items);
        if s.unique_items {
            out.insert("uniqueItems".into(), json!(true));
        }

        if !s.properties.is_empty() {
            let internal_props = pointer::push(&base, "properties");
            let doc_props = pointer::push(doc_path, "properties");
            let mut props = Map::new();
            for (name, prop) in &s.properties {
                let v = self.node(prop, &pointer::push(&internal_props, name), &pointer::push(&doc_props, name))?;
                props.insert(name.clone(), v);
            }
            out.insert("properties".into(), Value::Object(props));
        }
        let required = self.effective_required(s, doc_path)?;
        if !required.is_empty() {
            out.insert("required".into(), json!(required));
        }
        match &s.additional_properties {
            Some(AdditionalProperties::Allowed(allowed)) => {
                out.insert("additionalProperties".into(), json!(allowed));
            }
            Some(AdditionalProperties::Schema(extra)) => {
                let v = self.node(
                    extra,
                    &pointer::push(&base, "additionalProperties"),
                    &pointer::push(doc_path, "additionalProperties"),
                )?;
                out.insert("additionalProperties".into(), v);
            }
            None => {}
        }
        insert_count(&mut out, "maxProperties", s.max_properties);
        insert_count(&mut out, "minProperties", s.min_properties);

        for (keyword, branches) in [("allOf", &s.all_of), ("oneOf", &s.one_of), ("anyOf", &s.any_of)] {
            if branches.is_empty() {
                continue;
            }
            let internal_kw = pointer::push(&base, keyword);
            let doc_kw = pointer::push(doc_path, keyword);
            let mut rewritten = Vec::with_capacity(branches.len());
            for (i, branch) in branches.iter().enumerate() {
                let index = i.to_string();
                rewritten.push(self.node(branch, &pointer::push(&internal_kw, &index), &pointer::push(&doc_kw, &index))?);
            }
            out.insert(keyword.into(), Value::Array(rewritten));
        }
        if let Some(not) = &s.not {
            let v = self.node(not, &pointer::push(&base, "not"), &pointer::push(doc_path, "not"))?;
            out.insert("not".into(), v);
        }

        if !wrap_nullable {
            if let Some(default) = &s.default {
                out.insert("default".into(), default.clone());
            }
            return Ok(Value::Object(out));
        }

        let mut wrapper = Map::new();
        wrapper.insert("anyOf".into(), json!([{ "type": "null" }, Value::Object(out)]));
        if let Some(default) = &s.default {
            wrapper.insert("default".into(), default.clone());
        }
        Ok(Value::Object(wrapper))
    }

    /// `required` minus the properties hidden in this direction.
    fn effective_required(&self, s: &Schema, doc_path: &str) -> Result<Vec<String>, SchemaCompileError> {
        let mut required = Vec::with_capacity(s.required.len());
        for name in &s.required {
            let hidden = match s.properties.get(name) {
                Some(prop) => self.hidden(prop, doc_path)?,
                None => false,
            };
            if hidden {
                tracing::trace!(doc_path, property = %name, direction = %self.direction, "property not required in this direction");
            } else {
                required.push(name.clone());
            }
        }
        Ok(required)
    }

    /// True when the property is `readOnly` (requests) or `writeOnly`
    /// (responses), looking through `$ref` chains.
    fn hidden(&self, prop: &SchemaOrRef, doc_path: &str) -> Result<bool, SchemaCompileError> {
        let mut reference = match prop {
            SchemaOrRef::Schema(schema) => return Ok(self.marked(schema)),
            SchemaOrRef::Ref(r) => r.reference.clone(),
        };
        for _ in 0..MAX_REF_HOPS {
            let raw = self.ctx.resolve(&reference, doc_path)?;
            match read_schema(raw, &reference)? {
                SchemaOrRef::Schema(schema) => return Ok(self.marked(&schema)),
                SchemaOrRef::Ref(r) => reference = r.reference,
            }
        }
        Ok(false)
    }

    fn marked(&self, schema: &Schema) -> bool {
        match self.direction {
            Direction::Request => schema.read_only,
            Direction::Response => schema.write_only,
        }
    }
}

fn definition_ref(key: &str) -> Value {
    json!({ "$ref": format!("#{}", pointer::push("/definitions", key)) })
}

fn insert_number(out: &mut Map<String, Value>, keyword: &str, n: &Option<serde_json::Number>) {
    if let Some(n) = n {
        out.insert(keyword.into(), Value::Number(n.clone()));
    }
}

fn insert_count(out: &mut Map<String, Value>, keyword: &str, n: Option<u64>) {
    if let Some(n) = n {
        out.insert(keyword.into(), json!(n));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ValidatorOptions;

    fn ctx() -> ResolutionContext {
        ResolutionContext::new(
            json!({
                "components": {
                    "schemas": {
                        "Pet": {
                            "type": "object",
                            "required": ["id", "name", "secret"],
                            "properties": {
                                "id": {"type": "integer", "readOnly": true},
                                "name": {"type": "string"},
                                "secret": {"$ref": "#/components/schemas/Secret"}
                            },
                            "example": {"id": 1}
                        },
                        "Secret": {"type": "string", "writeOnly": true},
                        "Tags": {
                            "type": "array",
                            "nullable": true,
                            "items": {"$ref": "#/components/schemas/Tag"}
                        },
                        "Tag": {"type": "object", "nullable": true, "properties": {"label": {"type": "string"}}},
                        "Node": {
                            "type": "object",
                            "properties": {"next": {"$ref": "#/components/schemas/Node"}}
                        },
                        "Choice": {
                            "nullable": true,
                            "oneOf": [{"type": "string"}, {"type": "integer"}],
                            "default": "x"
                        },
                        "Color": {"type": "string", "nullable": true, "enum": ["red", "green"]},
                        "Broken": {"$ref": "#/components/schemas/Missing"},
                        "Limit": {"type": "integer", "format": "int32"},
                        "Ratio": {"type": "number", "format": "double"},
                        "Audited": {
                            "allOf": [
                                {"$ref": "#/components/schemas/Pet"},
                                {
                                    "type": "object",
                                    "required": ["createdAt", "note"],
                                    "properties": {
                                        "createdAt": {"type": "string", "readOnly": true},
                                        "note": {"type": "string"}
                                    }
                                }
                            ]
                        },
                        "Either": {
                            "oneOf": [
                                {
                                    "type": "object",
                                    "required": ["id", "kind", "token"],
                                    "properties": {
                                        "id": {"type": "integer", "readOnly": true},
                                        "kind": {"type": "string"},
                                        "token": {"type": "string", "writeOnly": true}
                                    }
                                },
                                {"type": "string"}
                            ]
                        },
                        "Batch": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "required": ["id", "qty"],
                                "properties": {
                                    "id": {"type": "integer", "readOnly": true},
                                    "qty": {"type": "integer"}
                                }
                            }
                        }
                    }
                }
            }),
            ValidatorOptions::default(),
        )
    }

    fn value_schema(t: &TransformedSchema) -> &Value {
        t.schema.pointer(VALUE_POINTER).unwrap()
    }

    #[test]
    fn test_wrapper_shape() {
        let t = transform(&ctx().at("#/components/schemas/Secret"), Direction::Request, true).unwrap();
        assert_eq!(t.schema["type"], "object");
        assert_eq!(t.schema["required"], json!(["value"]));
        assert_eq!(value_schema(&t), &json!({"type": "string"}));

        let optional = transform(&ctx().at("#/components/schemas/Secret"), Direction::Request, false).unwrap();
        assert!(optional.schema.get("required").is_none());
    }

    #[test]
    fn test_read_only_relaxed_for_requests() {
        let t = transform(&ctx().at("#/components/schemas/Pet"), Direction::Request, true).unwrap();
        assert_eq!(value_schema(&t)["required"], json!(["name", "secret"]));
        assert!(value_schema(&t)["properties"].get("id").is_some());
        assert!(value_schema(&t).get("example").is_none());
    }

    #[test]
    fn test_write_only_relaxed_through_ref_for_responses() {
        let t = transform(&ctx().at("#/components/schemas/Pet"), Direction::Response, true).unwrap();
        assert_eq!(value_schema(&t)["required"], json!(["id", "name"]));
    }

    #[test]
    fn test_read_only_relaxed_inside_all_of() {
        let ctx = ctx().at("#/components/schemas/Audited");
        let request = transform(&ctx, Direction::Request, true).unwrap();
        assert_eq!(value_schema(&request)["allOf"][1]["required"], json!(["note"]));
        assert_eq!(request.schema["definitions"]["Pet"]["required"], json!(["name", "secret"]));

        let response = transform(&ctx, Direction::Response, true).unwrap();
        assert_eq!(value_schema(&response)["allOf"][1]["required"], json!(["createdAt", "note"]));
        assert_eq!(response.schema["definitions"]["Pet"]["required"], json!(["id", "name"]));
    }

    #[test]
    fn test_direction_relaxes_one_of_branch() {
        let ctx = ctx().at("#/components/schemas/Either");
        let request = transform(&ctx, Direction::Request, true).unwrap();
        assert_eq!(value_schema(&request)["oneOf"][0]["required"], json!(["kind", "token"]));
        assert_eq!(value_schema(&request)["oneOf"][1], json!({"type": "string"}));

        let response = transform(&ctx, Direction::Response, true).unwrap();
        assert_eq!(value_schema(&response)["oneOf"][0]["required"], json!(["id", "kind"]));
    }

    #[test]
    fn test_read_only_relaxed_inside_array_items() {
        let ctx = ctx().at("#/components/schemas/Batch");
        let request = transform(&ctx, Direction::Request, true).unwrap();
        assert_eq!(value_schema(&request)["items"]["required"], json!(["qty"]));

        let response = transform(&ctx, Direction::Response, true).unwrap();
        assert_eq!(value_schema(&response)["items"]["required"], json!(["id", "qty"]));
    }

    #[test]
    fn test_bounded_numeric_format_gains_engine_keyword() {
        let t = transform(&ctx().at("#/components/schemas/Limit"), Direction::Request, true).unwrap();
        assert_eq!(
            value_schema(&t),
            &json!({"type": "integer", "format": "int32", NUMERIC_FORMAT_KEYWORD: "int32"})
        );

        let t = transform(&ctx().at("#/components/schemas/Ratio"), Direction::Request, true).unwrap();
        assert!(value_schema(&t).get(NUMERIC_FORMAT_KEYWORD).is_none());
        assert_eq!(value_schema(&t)["format"], "double");
    }

    #[test]
    fn test_nullable_array_and_items() {
        let t = transform(&ctx().at("#/components/schemas/Tags"), Direction::Request, true).unwrap();
        let v = value_schema(&t);
        assert_eq!(v["type"], json!(["array", "null"]));
        assert_eq!(v["items"], json!({"$ref": "#/definitions/Tag"}));
        assert_eq!(t.schema["definitions"]["Tag"]["type"], json!(["object", "null"]));
        assert_eq!(t.definitions, 1);
    }

    #[test]
    fn test_nullable_enum_gains_null() {
        let t = transform(&ctx().at("#/components/schemas/Color"), Direction::Request, true).unwrap();
        assert_eq!(value_schema(&t)["enum"], json!(["red", "green", null]));
    }

    #[test]
    fn test_nullable_composite_is_wrapped() {
        let t = transform(&ctx().at("#/components/schemas/Choice"), Direction::Request, true).unwrap();
        let v = value_schema(&t);
        assert_eq!(v["anyOf"][0], json!({"type": "null"}));
        assert_eq!(v["anyOf"][1]["oneOf"][1], json!({"type": "integer"}));
        assert_eq!(v["default"], "x");
        assert_eq!(
            t.paths.get("/properties/value/anyOf/1/oneOf/1"),
            Some("#/components/schemas/Choice/oneOf/1")
        );
        assert_eq!(t.paths.get("/properties/value"), Some("#/components/schemas/Choice"));
    }

    #[test]
    fn test_recursive_ref_compiles_once() {
        let t = transform(&ctx().at("#/components/schemas/Node"), Direction::Request, false).unwrap();
        assert_eq!(t.definitions, 1);
        assert_eq!(t.schema["definitions"]["Node"]["properties"]["next"], json!({"$ref": "#/definitions/Node"}));
    }

    #[test]
    fn test_paths_map_back_to_document() {
        let t = transform(&ctx().at("#/components/schemas/Pet"), Direction::Request, true).unwrap();
        assert_eq!(
            t.paths.get("/properties/value/properties/name"),
            Some("#/components/schemas/Pet/properties/name")
        );
        assert_eq!(t.paths.get("/definitions/Secret"), Some("#/components/schemas/Secret"));
    }

    #[test]
    fn test_definition_keys_are_unique() {
        let doc = json!({
            "a": {"Item": {"type": "string"}},
            "b": {"Item": {"type": "integer"}},
            "root": {
                "type": "object",
                "properties": {
                    "x": {"$ref": "#/a/Item"},
                    "y": {"$ref": "#/b/Item"}
                }
            }
        });
        let ctx = ResolutionContext::new(doc, ValidatorOptions::default()).at("#/root");
        let t = transform(&ctx, Direction::Request, true).unwrap();
        assert_eq!(t.schema["definitions"]["Item"]["type"], "string");
        assert_eq!(t.schema["definitions"]["Item_2"]["type"], "integer");
    }

    #[test]
    fn test_unresolved_ref_is_setup_error() {
        let err = transform(&ctx().at("#/components/schemas/Broken"), Direction::Request, true).unwrap_err();
        assert!(matches!(err, SchemaCompileError::UnresolvedRef { .. }), "got {err}");
    }

    #[test]
    fn test_document_is_not_mutated() {
        let c = ctx();
        let before = c.document().clone();
        transform(&c.at("#/components/schemas/Pet"), Direction::Request, true).unwrap();
        assert_eq!(c.document(), &before);
    }
}
