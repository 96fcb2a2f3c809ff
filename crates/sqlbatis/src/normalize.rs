//! Cleanup of `WHERE` clauses emptied by omitted conditionals.
//!
//! Three rewrites, applied in order, case-insensitive:
//!
//! 1. a trailing `WHERE` is removed;
//! 2. `WHERE AND ...` becomes `WHERE ...`;
//! 3. `WHERE` directly followed by `UNION`, `ORDER`, `GROUP` or `LIMIT` is removed.
//!
//! Rewrite 3 relies on rewrite 2: `WHERE AND ORDER BY` first collapses to
//! `WHERE ORDER BY`.

use crate::fragment::Fragment;
use regex::Regex;
use std::borrow::Cow;
use std::convert::Infallible;
use std::sync::OnceLock;

fn trailing_where_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\s+where\s*$").expect("invalid built-in regex"))
}

fn where_and_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(\s+)(where)(?:\s+and)+\s+").expect("invalid built-in regex")
    })
}

fn where_keyword_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\s+where\s+(union|order|group|limit)\b").expect("invalid built-in regex")
    })
}

/// Apply the three `WHERE` rewrites to an assembled statement.
///
/// Idempotent: normalizing an already-normalized statement changes nothing.
pub fn normalize_clauses(sql: &str) -> String {
    rewrite(sql, true)
}

/// Normalize the raw text of a fragment without disturbing its markers.
///
/// The trailing-`WHERE` rewrite only applies when raw text ends the fragment.
pub(crate) fn normalize_fragment(fragment: Fragment) -> Fragment {
    let normalized =
        fragment.map_raw(|raw, at_end| Ok::<_, Infallible>(Fragment::raw(rewrite(&raw, at_end))));
    match normalized {
        Ok(f) => f,
        Err(never) => match never {},
    }
}

fn rewrite(sql: &str, at_end: bool) -> String {
    let sql = if at_end {
        trailing_where_re().replace(sql, "")
    } else {
        Cow::Borrowed(sql)
    };
    let sql = where_and_re().replace_all(&sql, "${1}${2} ");
    let sql: Cow<'_, str> = where_keyword_re().replace_all(&sql, " ${1}");
    sql.into_owned()
}
