//! # JSON Pointers
//!
//! RFC 6901 helpers for document paths and instance paths. Document paths
//! may carry a leading `#` (the `$ref` form); instance paths never do.

use std::borrow::Cow;

use crate::error::PointerError;

/// Escape a single reference token (`~` → `~0`, `/` → `~1`).
pub fn escape(token: &str) -> Cow<'_, str> {
    if token.contains(['~', '/']) {
        Cow::Owned(token.replace('~', "~0").replace('/', "~1"))
    } else {
        Cow::Borrowed(token)
    }
}

/// Append one token to a pointer.
pub fn push(base: &str, token: &str) -> String {
    let token = escape(token);
    let mut out = String::with_capacity(base.len() + token.len() + 1);
    out.push_str(base);
    out.push('/');
    out.push_str(&token);
    out
}

/// Append several tokens to a pointer.
pub fn extend<'a>(base: &str, tokens: impl IntoIterator<Item = &'a str>) -> String {
    tokens
        .into_iter()
        .fold(base.to_string(), |acc, token| push(&acc, token))
}

/// Split a pointer into unescaped tokens. A leading `#` is ignored.
///
/// # Errors
///
/// Returns [`PointerError`] when the pointer does not start with `/` or
/// contains a malformed `~` escape.
pub fn parse(pointer: &str) -> Result<Vec<String>, PointerError> {
    let body = pointer.strip_prefix('#').unwrap_or(pointer);
    if body.is_empty() {
        return Ok(Vec::new());
    }
    let Some(rest) = body.strip_prefix('/') else {
        return Err(PointerError::MissingLeadingSlash(pointer.to_string()));
    };

    let mut tokens = Vec::new();
    let mut offset = pointer.len() - rest.len();
    for raw in rest.split('/') {
        tokens.push(unescape(raw).ok_or_else(|| PointerError::InvalidEscape {
            pointer: pointer.to_string(),
            offset: offset + raw.find('~').unwrap_or(0),
        })?);
        offset += raw.len() + 1;
    }
    Ok(tokens)
}

fn unescape(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '~' {
            match chars.next() {
                Some('0') => out.push('~'),
                Some('1') => out.push('/'),
                _ => return None,
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}

/// Turn a local `$ref` (`#/components/schemas/Pet`) into the pointer form
/// accepted by [`serde_json::Value::pointer`].
///
/// # Errors
///
/// Returns [`PointerError::NotLocal`] for references into other documents.
pub fn local_fragment(reference: &str) -> Result<&str, PointerError> {
    match reference.strip_prefix('#') {
        Some(fragment) if fragment.is_empty() || fragment.starts_with('/') => Ok(fragment),
        _ => Err(PointerError::NotLocal(reference.to_string())),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any token sequence, including `~` and `/`, survives a join and split.
        #[test]
        fn tokens_survive_join(tokens in prop::collection::vec(".{0,12}", 0..6)) {
            let joined = extend("#", tokens.iter().map(String::as_str));
            prop_assert_eq!(parse(&joined).unwrap(), tokens);
        }
    }
}
