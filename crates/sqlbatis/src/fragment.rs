//! Resolved SQL pieces.
//!
//! A [`Fragment`] stores SQL text and bound-parameter markers separately, plus
//! the bound values in marker order. Markers are only rendered at the end, so
//! `$1, $2, ...` numbering always follows the final statement.

use crate::config::PlaceholderStyle;
use serde_json::Value;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq)]
enum SqlPart {
    Raw(String),
    Param,
}

/// SQL text with positional parameter markers and their values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    parts: Vec<SqlPart>,
    params: Vec<Value>,
}

impl Fragment {
    /// Create an empty fragment.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a fragment holding raw SQL only.
    pub fn raw(sql: impl Into<String>) -> Self {
        let sql = sql.into();
        let mut f = Self::empty();
        if !sql.is_empty() {
            f.parts.push(SqlPart::Raw(sql));
        }
        f
    }

    /// Append raw SQL (no parameters).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }

        match self.parts.last_mut() {
            Some(SqlPart::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(SqlPart::Raw(sql.to_string())),
        }
        self
    }

    /// Append a parameter marker and bind its value.
    pub fn push_bind(&mut self, value: Value) -> &mut Self {
        self.parts.push(SqlPart::Param);
        self.params.push(value);
        self
    }

    /// Append another fragment, consuming it.
    pub fn push_fragment(&mut self, other: Fragment) -> &mut Self {
        for part in other.parts {
            match part {
                SqlPart::Raw(s) => {
                    self.push(&s);
                }
                SqlPart::Param => self.parts.push(SqlPart::Param),
            }
        }
        self.params.extend(other.params);
        self
    }

    /// Join fragments with `separator`, keeping parameters in order.
    pub fn join(fragments: impl IntoIterator<Item = Fragment>, separator: &str) -> Fragment {
        let mut out = Fragment::empty();
        for (i, f) in fragments.into_iter().enumerate() {
            if i > 0 {
                out.push(separator);
            }
            out.push_fragment(f);
        }
        out
    }

    /// Number of parameter markers.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Bound values, in marker order.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn into_params(self) -> Vec<Value> {
        self.params
    }

    /// Rewrite every raw piece in place; markers are left untouched.
    ///
    /// The callback also learns whether the piece ends the fragment.
    pub(crate) fn map_raw<E>(
        self,
        mut f: impl FnMut(String, bool) -> Result<Fragment, E>,
    ) -> Result<Fragment, E> {
        let last = self.parts.len().saturating_sub(1);
        let mut out = Fragment::empty();
        let mut params = self.params.into_iter();
        for (i, part) in self.parts.into_iter().enumerate() {
            match part {
                SqlPart::Raw(s) => {
                    out.push_fragment(f(s, i == last)?);
                }
                SqlPart::Param => {
                    out.push_bind(params.next().unwrap_or(Value::Null));
                }
            }
        }
        Ok(out)
    }

    /// Render SQL with markers in the given style.
    pub fn to_sql(&self, style: PlaceholderStyle) -> String {
        let mut out = String::new();
        let mut idx: usize = 0;

        for part in &self.parts {
            match part {
                SqlPart::Raw(s) => out.push_str(s),
                SqlPart::Param => {
                    idx += 1;
                    match style {
                        PlaceholderStyle::Question => out.push('?'),
                        PlaceholderStyle::Dollar => {
                            let _ = write!(&mut out, "${}", idx);
                        }
                    }
                }
            }
        }
        out
    }
}
