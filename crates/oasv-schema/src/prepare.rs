//! # Value Preparation
//!
//! A pass over the candidate value, guided by the wrapper schema, that
//! runs before the engine checks it:
//!
//! - coerces primitive types (requests without a JSON body only),
//! - fills absent properties that declare a `default`,
//! - removes properties undeclared by an `additionalProperties: false`
//!   node.
//!
//! The pass never reports errors; every assertion, numeric formats
//! included, belongs to the engine.
//!
//! Defaults are only filled into objects that exist in the value; an
//! absent intermediate object is never fabricated unless it carries its
//! own `default`, in which case the inserted value is prepared like any
//! other. `oneOf`/`anyOf`/`not` branches are not entered, since which
//! branch applies is unknown before validation.

use oasv_core::pointer;
use serde_json::{Map, Value};

use crate::coerce;
use crate::paths::{self, MAX_REF_HOPS};
use crate::transform::VALUE_POINTER;

/// Coercion settings for one validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Coercion {
    pub arrays: bool,
}

pub(crate) struct Preparer<'a> {
    root: &'a Value,
    coercion: Option<Coercion>,
    strip_additional: bool,
}

impl<'a> Preparer<'a> {
    pub(crate) fn new(root: &'a Value, coercion: Option<Coercion>, strip_additional: bool) -> Self {
        Self {
            root,
            coercion,
            strip_additional,
        }
    }

    /// Prepare the wrapper instance `{"value": ...}` in place.
    pub(crate) fn run(&self, instance: &mut Value) {
        if let (Some(schema), Some(value)) = (self.root.pointer(VALUE_POINTER), instance.get_mut("value")) {
            self.visit(schema, value, 0);
        }
    }

    fn visit(&self, schema: &'a Value, value: &mut Value, hops: usize) {
        if hops > MAX_REF_HOPS {
            return;
        }
        if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
            let target = pointer::local_fragment(reference)
                .ok()
                .and_then(|fragment| self.root.pointer(fragment));
            if let Some(target) = target {
                self.visit(target, value, hops + 1);
            }
            return;
        }
        if let Some(inner) = nullable_inner(schema) {
            if !value.is_null() {
                self.visit(inner, value, hops + 1);
            }
            return;
        }

        if let Some(coercion) = self.coercion {
            coerce::coerce(schema, value, coercion.arrays);
        }

        match value {
            Value::Object(map) => self.visit_object(schema, map),
            Value::Array(items) => {
                if let Some(item_schema) = schema.get("items").filter(|s| s.is_object()) {
                    for item in items.iter_mut() {
                        self.visit(item_schema, item, 0);
                    }
                }
            }
            _ => {}
        }

        if let Some(Value::Array(branches)) = schema.get("allOf") {
            for branch in branches {
                self.visit(branch, value, hops + 1);
            }
        }
    }

    fn visit_object(&self, schema: &'a Value, map: &mut Map<String, Value>) {
        let props = schema.get("properties").and_then(Value::as_object);

        if let Some(props) = props {
            for (name, prop_schema) in props {
                if map.contains_key(name) {
                    continue;
                }
                if let Some(default) = self.default_for(prop_schema) {
                    map.insert(name.clone(), default.clone());
                }
            }
        }

        let declared = |key: &str| props.is_some_and(|p| p.contains_key(key));
        match schema.get("additionalProperties") {
            Some(Value::Bool(false)) if self.strip_additional => {
                map.retain(|key, _| declared(key.as_str()));
            }
            Some(extra) if extra.is_object() => {
                for (key, child) in map.iter_mut() {
                    if !declared(key.as_str()) {
                        self.visit(extra, child, 0);
                    }
                }
            }
            _ => {}
        }

        if let Some(props) = props {
            for (name, prop_schema) in props {
                if let Some(child) = map.get_mut(name) {
                    self.visit(prop_schema, child, 0);
                }
            }
        }
    }

    fn default_for(&self, schema: &'a Value) -> Option<&'a Value> {
        let target = paths::follow_refs(self.root, schema).map_or(schema, |(_, target)| target);
        target.get("default")
    }
}

/// The inner node of a nullable-composite wrapper
/// `{"anyOf": [{"type": "null"}, <inner>]}`.
fn nullable_inner(schema: &Value) -> Option<&Value> {
    match schema.get("anyOf") {
        Some(Value::Array(branches))
            if branches.len() == 2 && branches[0].get("type").and_then(Value::as_str) == Some("null") =>
        {
            Some(&branches[1])
        }
        _ => None,
    }
}
