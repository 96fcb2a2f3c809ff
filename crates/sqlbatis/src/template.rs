//! Pre-parsed template representation.
//!
//! A [`Template`] is an ordered sequence of [`Node`]s. Templates are built once
//! (usually by the loader) and never mutated afterwards; the engine only ever
//! borrows them.

use serde::Serialize;
use std::fmt;

/// One unit of a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// Raw SQL text with zero or more placeholders. Always included.
    Literal { text: String },
    /// SQL body included only when `test` evaluates truthy.
    Conditional { test: String, body: String },
    /// SQL body rendered once per element of `array_key`, joined by `separator`.
    Repetition {
        array_key: String,
        separator: String,
        body: String,
    },
}

impl Node {
    /// Create a literal node.
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal { text: text.into() }
    }

    /// Create a conditional node.
    pub fn conditional(test: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Conditional {
            test: test.into(),
            body: body.into(),
        }
    }

    /// Create a repetition node.
    pub fn repetition(
        array_key: impl Into<String>,
        separator: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self::Repetition {
            array_key: array_key.into(),
            separator: separator.into(),
            body: body.into(),
        }
    }

    /// Short name of the node kind (`literal`, `if`, `for`).
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Literal { .. } => "literal",
            Self::Conditional { .. } => "if",
            Self::Repetition { .. } => "for",
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal { text } => write!(f, "{text}"),
            Self::Conditional { test, body } => write!(f, "if ({test}) [{body}]"),
            Self::Repetition {
                array_key,
                separator,
                body,
            } => write!(f, "for ({array_key}, {separator:?}) [{body}]"),
        }
    }
}

/// An immutable, ordered sequence of nodes representing one named statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    /// Create a template from its nodes.
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// All nodes, in evaluation order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl From<Vec<Node>> for Template {
    fn from(nodes: Vec<Node>) -> Self {
        Self::new(nodes)
    }
}

impl FromIterator<Node> for Template {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Template {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}
