//! # Path Rewrite Table
//!
//! The transformer emits a wrapper schema whose layout differs from the
//! original document: the target sits under `/properties/value`, every
//! referenced schema is copied into `/definitions`, and nullable
//! composites gain a synthetic `anyOf`. The [`PathTable`] records, for
//! each emitted node, the document path it was built from so engine
//! errors can be reported against the original document.

use std::collections::HashMap;

use oasv_core::pointer;
use serde_json::Value;

/// Consecutive `$ref` hops followed before giving up on a chain.
pub(crate) const MAX_REF_HOPS: usize = 32;

/// Internal schema pointer → original document path.
#[derive(Debug, Clone, Default)]
pub struct PathTable {
    nodes: HashMap<String, String>,
}

impl PathTable {
    pub(crate) fn insert(&mut self, internal: impl Into<String>, doc_path: impl Into<String>) {
        self.nodes.insert(internal.into(), doc_path.into());
    }

    /// Document path recorded for an exact internal pointer.
    pub fn get(&self, internal: &str) -> Option<&str> {
        self.nodes.get(internal).map(String::as_str)
    }

    /// Number of recorded nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Document path of the most specific schema node on an engine
    /// `schema_path`. Trailing keyword tokens (`type`, `required`, ...)
    /// are dropped until a recorded node is reached.
    pub fn doc_path_for(&self, schema: &Value, schema_path: &str) -> Option<&str> {
        let mut tokens = canonical_tokens(schema, schema_path);
        loop {
            let internal = pointer::extend("", tokens.iter().map(String::as_str));
            if let Some(doc_path) = self.get(&internal) {
                return Some(doc_path);
            }
            tokens.pop()?;
        }
    }
}

/// Rewrite an engine schema path into tokens of a concrete pointer into
/// `schema`, following `$ref` hops whether or not the engine reported
/// them as `$ref` tokens.
pub fn canonical_tokens(schema: &Value, schema_path: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut node = Some(schema);

    for token in pointer::parse(schema_path).unwrap_or_default() {
        if token == "$ref" {
            if let Some((tokens, target)) = node.and_then(|n| follow_refs(schema, n)) {
                out = tokens;
                node = Some(target);
                continue;
            }
        } else if let Some((tokens, target)) = node.and_then(|n| follow_refs(schema, n)) {
            out = tokens;
            node = Some(target);
        }

        node = node.and_then(|n| match n {
            Value::Object(map) => map.get(&token),
            Value::Array(items) => token.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        });
        out.push(token);
    }
    out
}

/// Follow a chain of `$ref` nodes from `node` to a non-reference node.
/// Returns `None` when `node` is not a reference or the chain is broken.
pub(crate) fn follow_refs<'a>(root: &'a Value, node: &'a Value) -> Option<(Vec<String>, &'a Value)> {
    let mut current = node;
    let mut tokens = None;
    for _ in 0..MAX_REF_HOPS {
        let Some(reference) = current.get("$ref").and_then(Value::as_str) else {
            return tokens.map(|t| (t, current));
        };
        let fragment = pointer::local_fragment(reference).ok()?;
        current = root.pointer(fragment)?;
        tokens = Some(pointer::parse(fragment).ok()?);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wrapper() -> Value {
        json!({
            "type": "object",
            "properties": {
                "value": {
                    "type": "object",
                    "properties": {
                        "pet": {"$ref": "#/definitions/components~1schemas~1Pet"}
                    }
                }
            },
            "definitions": {
                "components/schemas/Pet": {
                    "type": "object",
                    "properties": {"name": {"type": "string"}},
                    "required": ["name"]
                }
            }
        })
    }

    fn table() -> PathTable {
        let mut t = PathTable::default();
        t.insert("/properties/value", "#/components/schemas/Owner");
        t.insert(
            "/properties/value/properties/pet",
            "#/components/schemas/Owner/properties/pet",
        );
        t.insert("/definitions/components~1schemas~1Pet", "#/components/schemas/Pet");
        t.insert(
            "/definitions/components~1schemas~1Pet/properties/name",
            "#/components/schemas/Pet/properties/name",
        );
        t
    }

    #[test]
    fn test_len_counts_recorded_nodes() {
        assert!(PathTable::default().is_empty());
        let t = table();
        assert!(!t.is_empty());
        assert_eq!(t.len(), 4);
        assert_eq!(t.get("/definitions/components~1schemas~1Pet"), Some("#/components/schemas/Pet"));
    }

    #[test]
    fn test_keyword_is_dropped() {
        let schema = wrapper();
        assert_eq!(
            table().doc_path_for(&schema, "/properties/value/type"),
            Some("#/components/schemas/Owner")
        );
    }

    #[test]
    fn test_explicit_ref_token_is_followed() {
        let schema = wrapper();
        assert_eq!(
            table().doc_path_for(&schema, "/properties/value/properties/pet/$ref/properties/name/type"),
            Some("#/components/schemas/Pet/properties/name")
        );
        assert_eq!(
            table().doc_path_for(&schema, "/properties/value/properties/pet/$ref/required"),
            Some("#/components/schemas/Pet")
        );
    }

    #[test]
    fn test_implicit_ref_is_followed() {
        let schema = wrapper();
        assert_eq!(
            table().doc_path_for(&schema, "/properties/value/properties/pet/properties/name/type"),
            Some("#/components/schemas/Pet/properties/name")
        );
    }

    #[test]
    fn test_unknown_path_falls_back_to_nearest_node() {
        let schema = wrapper();
        assert_eq!(
            table().doc_path_for(&schema, "/properties/value/properties/ghost/type"),
            Some("#/components/schemas/Owner")
        );
        assert_eq!(table().doc_path_for(&schema, "/required"), None);
    }

    #[test]
    fn test_ref_cycle_is_bounded() {
        let schema = json!({
            "definitions": {
                "a": {"$ref": "#/definitions/b"},
                "b": {"$ref": "#/definitions/a"}
            }
        });
        assert!(follow_refs(&schema, &schema["definitions"]["a"]).is_none());
    }
}
