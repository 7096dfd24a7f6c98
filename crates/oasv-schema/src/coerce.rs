//! # Type Coercion
//!
//! Converts text-shaped request values toward their declared type. Applied
//! only to request values that did not arrive as a JSON body. A value that
//! already matches one of the declared types is left alone; otherwise the
//! declared types are tried in order and the first successful conversion
//! wins. A value that converts to nothing is left for the engine to reject.

use serde_json::{Number, Value};

/// Coerce `value` toward the `type` of `schema`, in place.
pub(crate) fn coerce(schema: &Value, value: &mut Value, arrays: bool) {
    let types: Vec<&str> = match schema.get("type") {
        Some(Value::String(t)) => vec![t.as_str()],
        Some(Value::Array(ts)) => ts.iter().filter_map(Value::as_str).collect(),
        _ => return,
    };
    if types.iter().any(|t| has_type(t, value)) {
        return;
    }

    if arrays {
        if types.contains(&"array") {
            let item = value.take();
            *value = Value::Array(vec![item]);
            return;
        }
        // A single item is unwrapped only when it matches or converts.
        let unwrapped = match value {
            Value::Array(items) if items.len() == 1 => {
                let item = &items[0];
                if types.iter().any(|t| has_type(t, item)) {
                    Some(item.clone())
                } else {
                    types.iter().find_map(|t| convert(t, item))
                }
            }
            _ => None,
        };
        if let Some(item) = unwrapped {
            *value = item;
            return;
        }
    }

    if let Some(coerced) = types.iter().find_map(|t| convert(t, value)) {
        *value = coerced;
    }
}

fn has_type(t: &str, value: &Value) -> bool {
    match t {
        "null" => value.is_null(),
        "boolean" => value.is_boolean(),
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => is_integer(value),
        "array" => value.is_array(),
        "object" => value.is_object(),
        _ => false,
    }
}

fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0),
        _ => false,
    }
}

fn convert(t: &str, value: &Value) -> Option<Value> {
    match (t, value) {
        ("number", Value::String(s)) => parse_number(s),
        ("integer", Value::String(s)) => parse_integer(s),
        ("boolean", Value::String(s)) => match s.as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        ("null", Value::String(s)) if s.is_empty() => Some(Value::Null),
        ("string", Value::Number(n)) => Some(Value::String(n.to_string())),
        ("string", Value::Bool(b)) => Some(Value::String(b.to_string())),
        _ => None,
    }
}

fn parse_number(s: &str) -> Option<Value> {
    if let Some(n) = parse_integer(s) {
        return Some(n);
    }
    s.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
        .map(Value::Number)
}

fn parse_integer(s: &str) -> Option<Value> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(Value::from(i));
    }
    if let Ok(u) = s.parse::<u64>() {
        return Some(Value::from(u));
    }
    let f = s.parse::<f64>().ok().filter(|f| f.is_finite() && f.fract() == 0.0)?;
    if f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(Value::from(f as i64))
    } else {
        None
    }
}
