//! # Schema Model
//!
//! A typed view of the OpenAPI 3.0 Schema Object subset the compiler
//! understands. `$ref` is an explicit [`SchemaOrRef::Ref`] node and is
//! resolved through the [`crate::ResolutionContext`], never inline.
//!
//! Keywords that only annotate (`example`, `discriminator`, `xml`,
//! `externalDocs`, `deprecated`, `x-*`) are ignored on read and therefore
//! never reach the validation engine.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Number, Value};

/// A schema node or a reference to one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SchemaOrRef {
    /// `{ "$ref": "#/components/schemas/Pet" }`. Siblings are ignored, as
    /// OpenAPI 3.0 specifies.
    Ref(Reference),
    /// An inline Schema Object.
    Schema(Box<Schema>),
}

/// The target of a `$ref`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Reference {
    /// The reference string as written.
    #[serde(rename = "$ref")]
    pub reference: String,
}

/// The primitive `type` of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl SchemaType {
    /// The JSON Schema type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

/// `additionalProperties` is either a flag or a schema.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(SchemaOrRef),
}

/// An OpenAPI 3.0 Schema Object.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Schema {
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,
    pub format: Option<String>,
    pub nullable: bool,
    pub read_only: bool,
    pub write_only: bool,
    pub default: Option<Value>,
    #[serde(rename = "enum")]
    pub enumeration: Option<Vec<Value>>,

    // numbers
    pub multiple_of: Option<Number>,
    pub maximum: Option<Number>,
    pub exclusive_maximum: bool,
    pub minimum: Option<Number>,
    pub exclusive_minimum: bool,

    // strings
    pub max_length: Option<u64>,
    pub min_length: Option<u64>,
    pub pattern: Option<String>,

    // arrays
    pub items: Option<SchemaOrRef>,
    pub max_items: Option<u64>,
    pub min_items: Option<u64>,
    pub unique_items: bool,

    // objects
    pub properties: IndexMap<String, SchemaOrRef>,
    pub required: Vec<String>,
    pub additional_properties: Option<AdditionalProperties>,
    pub max_properties: Option<u64>,
    pub min_properties: Option<u64>,

    // composition
    pub all_of: Vec<SchemaOrRef>,
    pub one_of: Vec<SchemaOrRef>,
    pub any_of: Vec<SchemaOrRef>,
    pub not: Option<SchemaOrRef>,
}

impl Schema {
    /// True when the node combines other schemas.
    pub fn is_composite(&self) -> bool {
        !self.all_of.is_empty() || !self.one_of.is_empty() || !self.any_of.is_empty() || self.not.is_some()
    }
}

impl SchemaOrRef {
    /// Read a schema node from raw document JSON.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }
}

/// Document-relative pointers (under `base`) of every `$ref` node that
/// also carries sibling keywords. Those siblings are silently dropped.
pub(crate) fn ref_siblings(value: &Value, base: &str) -> Vec<String> {
    let mut found = Vec::new();
    collect_ref_siblings(value, base, &mut found);
    found
}

fn collect_ref_siblings(value: &Value, at: &str, found: &mut Vec<String>) {
    let Some(obj) = value.as_object() else {
        return;
    };
    if obj.contains_key("$ref") {
        if obj.len() > 1 {
            found.push(at.to_string());
        }
        return;
    }
    for key in ["items", "not"] {
        if let Some(child) = obj.get(key) {
            collect_ref_siblings(child, &oasv_core::pointer::push(at, key), found);
        }
    }
    if let Some(child) = obj.get("additionalProperties").filter(|v| v.is_object()) {
        collect_ref_siblings(child, &oasv_core::pointer::push(at, "additionalProperties"), found);
    }
    if let Some(Value::Object(props)) = obj.get("properties") {
        let props_at = oasv_core::pointer::push(at, "properties");
        for (name, child) in props {
            collect_ref_siblings(child, &oasv_core::pointer::push(&props_at, name), found);
        }
    }
    for key in ["allOf", "oneOf", "anyOf"] {
        if let Some(Value::Array(branches)) = obj.get(key) {
            let key_at = oasv_core::pointer::push(at, key);
            for (i, child) in branches.iter().enumerate() {
                collect_ref_siblings(child, &oasv_core::pointer::push(&key_at, &i.to_string()), found);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ref_node_is_explicit() {
        let node = SchemaOrRef::from_value(&json!({"$ref": "#/components/schemas/Pet"})).unwrap();
        assert_eq!(
            node,
            SchemaOrRef::Ref(Reference {
                reference: "#/components/schemas/Pet".into()
            })
        );
    }

    #[test]
    fn test_object_schema_keeps_declaration_order() {
        let node = SchemaOrRef::from_value(&json!({
            "type": "object",
            "required": ["b", "a"],
            "properties": {
                "b": {"type": "string", "readOnly": true},
                "a": {"$ref": "#/components/schemas/A"}
            },
            "additionalProperties": false,
            "example": {"b": "x"}
        }))
        .unwrap();
        let SchemaOrRef::Schema(schema) = node else {
            panic!("expected inline schema");
        };
        assert_eq!(schema.schema_type, Some(SchemaType::Object));
        let names: Vec<&str> = schema.properties.keys().map(String::as_str).collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(schema.additional_properties, Some(AdditionalProperties::Allowed(false)));
        match &schema.properties["b"] {
            SchemaOrRef::Schema(b) => assert!(b.read_only),
            other => panic!("expected inline schema, got {other:?}"),
        }
    }

    #[test]
    fn test_nullable_array_of_refs() {
        let node = SchemaOrRef::from_value(&json!({
            "type": "array",
            "nullable": true,
            "items": {"$ref": "#/components/schemas/Item"}
        }))
        .unwrap();
        let SchemaOrRef::Schema(schema) = node else {
            panic!("expected inline schema");
        };
        assert!(schema.nullable);
        assert!(matches!(schema.items, Some(SchemaOrRef::Ref(_))));
    }

    #[test]
    fn test_rejects_unknown_type() {
        assert!(SchemaOrRef::from_value(&json!({"type": "file"})).is_err());
    }

    #[test]
    fn test_ref_siblings_found_at_depth() {
        let value = json!({
            "type": "object",
            "properties": {
                "a": {"$ref": "#/components/schemas/A", "nullable": true},
                "b": {"$ref": "#/components/schemas/B"}
            },
            "allOf": [{"$ref": "#/x", "description": "dropped"}]
        });
        assert_eq!(
            ref_siblings(&value, "#/components/schemas/Root"),
            vec![
                "#/components/schemas/Root/properties/a".to_string(),
                "#/components/schemas/Root/allOf/0".to_string(),
            ]
        );
    }
}
