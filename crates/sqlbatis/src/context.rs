//! Identifier resolution against a data context.
//!
//! Identifiers use the placeholder grammar `[A-Za-z0-9_.]+`. Lookup tries the
//! exact key first and only then walks dotted paths through nested objects.

use serde_json::Value;
use std::borrow::Cow;

/// Runtime input used to resolve placeholders and evaluate conditions.
///
/// Normally a JSON object. `null` behaves like an empty object. Any other
/// value is a repetition element and is bound to every identifier.
pub type DataContext = Value;

/// Resolve `ident` against `ctx`. `None` means the identifier is absent.
pub fn lookup<'a>(ctx: &'a Value, ident: &str) -> Option<Cow<'a, Value>> {
    match ctx {
        Value::Null => None,
        Value::Object(map) => {
            if let Some(v) = map.get(ident) {
                return Some(Cow::Borrowed(v));
            }
            if !ident.contains('.') {
                return None;
            }
            lookup_path(ctx, ident)
        }
        element => Some(Cow::Borrowed(element)),
    }
}

/// Resolve `ident`, substituting `null` when it is absent.
pub fn lookup_or_null(ctx: &Value, ident: &str) -> Value {
    lookup(ctx, ident)
        .map(Cow::into_owned)
        .unwrap_or(Value::Null)
}

fn lookup_path<'a>(root: &'a Value, path: &str) -> Option<Cow<'a, Value>> {
    let mut current = root;
    let mut segments = path.split('.').peekable();

    while let Some(seg) = segments.next() {
        if seg.is_empty() {
            return None;
        }
        match current {
            Value::Object(map) => current = map.get(seg)?,
            Value::Array(items) => {
                if seg == "length" && segments.peek().is_none() {
                    return Some(Cow::Owned(Value::from(items.len())));
                }
                let idx: usize = seg.parse().ok()?;
                current = items.get(idx)?;
            }
            Value::String(s) if seg == "length" && segments.peek().is_none() => {
                return Some(Cow::Owned(Value::from(s.chars().count())));
            }
            _ => return None,
        }
    }

    Some(Cow::Borrowed(current))
}

/// Textual form of a value for literal (`::ident`) substitution.
///
/// Strings are inlined without quotes, `null` becomes the empty string and
/// arrays are joined with `,`.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => display_float(f),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// `10.0` prints as `10`, `-0.0` as `0`.
fn display_float(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }
    f.to_string()
}
