//! Placeholder resolution inside literal SQL text.
//!
//! Three syntaxes, always applied in this order:
//!
//! 1. `::name` — replaced by the textual value of `name` (no binding, no escaping).
//! 2. `:name` — replaced by a parameter marker; the value is bound.
//! 3. `{{ namespace.key }}` — replaced by the rendered SQL of another template.
//!
//! The order is observable: a value inlined by `::name` is itself scanned for
//! `:name` and `{{ ... }}`, while bound values never are.

use crate::context::{display_value, lookup_or_null};
use crate::error::BatisResult;
use crate::fragment::Fragment;
use regex::{Captures, Regex};
use serde_json::Value;
use std::borrow::Cow;
use std::sync::OnceLock;

fn literal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"::([A-Za-z0-9_.]+)").expect("invalid built-in literal regex"))
}

fn bound_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r":([A-Za-z0-9_.]+)").expect("invalid built-in bound regex"))
}

fn include_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z0-9_.]+)\s*\}\}").expect("invalid built-in include regex")
    })
}

/// Replace every `::name` with the textual value of `name` (empty if absent).
pub fn substitute_literals<'t>(text: &'t str, ctx: &Value) -> Cow<'t, str> {
    literal_re().replace_all(text, |caps: &Captures| {
        display_value(&lookup_or_null(ctx, &caps[1]))
    })
}

/// Split `text` at every `:name`, binding the values left to right.
pub fn bind_params(text: &str, ctx: &Value) -> Fragment {
    let mut out = Fragment::empty();
    let mut last = 0;
    for caps in bound_re().captures_iter(text) {
        let whole = caps.get(0).expect("capture group 0 always exists");
        out.push(&text[last..whole.start()]);
        out.push_bind(lookup_or_null(ctx, &caps[1]));
        last = whole.end();
    }
    out.push(&text[last..]);
    out
}

/// Replace every `{{ namespace.key }}` with the fragment produced by `include`.
pub fn expand_includes(
    text: &str,
    include: &mut dyn FnMut(&str) -> BatisResult<Fragment>,
) -> BatisResult<Fragment> {
    let mut out = Fragment::empty();
    let mut last = 0;
    for caps in include_re().captures_iter(text) {
        let whole = caps.get(0).expect("capture group 0 always exists");
        out.push(&text[last..whole.start()]);
        out.push_fragment(include(&caps[1])?);
        last = whole.end();
    }
    out.push(&text[last..]);
    Ok(out)
}

/// Resolve all three placeholder kinds in `text`.
///
/// Absent identifiers resolve to `null` (bound) or the empty string (inlined).
/// `include` is called with the qualified key of each nested reference.
pub fn resolve(
    text: &str,
    ctx: &Value,
    include: &mut dyn FnMut(&str) -> BatisResult<Fragment>,
) -> BatisResult<Fragment> {
    let inlined = substitute_literals(text, ctx);
    let bound = bind_params(&inlined, ctx);
    bound.map_raw(|raw, _| expand_includes(&raw, include))
}
