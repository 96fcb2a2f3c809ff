//! Template evaluation.
//!
//! [`Engine`] looks templates up by `namespace.key`, evaluates each node
//! against a data context, joins the included fragments with a single space
//! and cleans up `WHERE` clauses left empty by omitted conditionals.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use sqlbatis::{Engine, Node, Registry, Template};
//!
//! let mut registry = Registry::new();
//! registry.insert(
//!     "user",
//!     "search",
//!     Template::new(vec![
//!         Node::literal("SELECT * FROM users WHERE"),
//!         Node::conditional(":name != null", "AND name = :name"),
//!         Node::conditional(":minAge != null", "AND age >= :minAge"),
//!         Node::literal("ORDER BY id"),
//!     ]),
//! );
//!
//! let engine = Engine::new(registry);
//! let out = engine.get("user.search", &json!({ "minAge": 18 })).unwrap();
//! assert_eq!(out.sql, "SELECT * FROM users WHERE age >= ? ORDER BY id");
//! assert_eq!(out.params, vec![json!(18)]);
//! ```

use crate::config::{EngineConfig, NestedParams};
use crate::context::{DataContext, lookup};
use crate::error::{BatisError, BatisResult};
use crate::expr::test_passes;
use crate::fragment::Fragment;
use crate::normalize::normalize_fragment;
use crate::placeholder;
use crate::registry::{QualifiedKey, Registry, TemplateSource};
use crate::template::{Node, Template};
use serde::Serialize;
use serde_json::Value;

/// Final SQL text plus its bound parameters, in marker order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedSql {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Renders registered templates into parameterized SQL.
///
/// The engine only reads its template source, so one engine can serve any
/// number of threads at once.
#[derive(Debug, Clone)]
pub struct Engine<S = Registry> {
    source: S,
    config: EngineConfig,
}

impl<S: TemplateSource> Engine<S> {
    /// Create an engine with the default configuration.
    pub fn new(source: S) -> Self {
        Self::with_config(source, EngineConfig::default())
    }

    /// Create an engine with a custom configuration.
    pub fn with_config(source: S, config: EngineConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// The unresolved template registered as `namespace.key`.
    pub fn get_raw(&self, qualified_key: &str) -> BatisResult<&Template> {
        let key = QualifiedKey::parse(qualified_key)?;
        if let Some(template) = self.source.lookup(key.namespace, key.key) {
            return Ok(template);
        }

        if self.source.has_namespace(key.namespace) {
            tracing::warn!(target: "sqlbatis.render", key = %key, "template not found");
            Err(BatisError::template_not_found(key.namespace, key.key))
        } else {
            tracing::warn!(target: "sqlbatis.render", namespace = key.namespace, "namespace not found");
            Err(BatisError::NamespaceNotFound(key.namespace.to_string()))
        }
    }

    /// Render the template registered as `namespace.key` against `data`.
    pub fn get(&self, qualified_key: &str, data: &DataContext) -> BatisResult<RenderedSql> {
        let template = self.get_raw(qualified_key)?;
        let rendered = self.finish(self.assemble(template, data, 0)?);
        tracing::trace!(
            target: "sqlbatis.render",
            key = qualified_key,
            param_count = rendered.params.len(),
            sql = %rendered.sql,
            "rendered template"
        );
        Ok(rendered)
    }

    /// Render a template that is not (necessarily) registered.
    ///
    /// `{{ namespace.key }}` references inside it still resolve through the
    /// engine's template source.
    pub fn render_template(&self, template: &Template, data: &DataContext) -> BatisResult<RenderedSql> {
        Ok(self.finish(self.assemble(template, data, 0)?))
    }

    fn finish(&self, fragment: Fragment) -> RenderedSql {
        RenderedSql {
            sql: fragment.to_sql(self.config.placeholder),
            params: fragment.into_params(),
        }
    }

    /// Evaluate every node, join the included ones with a space and normalize.
    fn assemble(&self, template: &Template, data: &Value, depth: usize) -> BatisResult<Fragment> {
        let mut included = Vec::with_capacity(template.len());
        for node in template {
            match self.eval_node(node, data, depth)? {
                Some(fragment) => included.push(fragment),
                None => {
                    tracing::trace!(target: "sqlbatis.render", kind = node.kind_name(), "node omitted");
                }
            }
        }
        Ok(normalize_fragment(Fragment::join(included, " ")))
    }

    /// `None` means the node was omitted and contributes nothing.
    fn eval_node(&self, node: &Node, data: &Value, depth: usize) -> BatisResult<Option<Fragment>> {
        match node {
            Node::Literal { text } => self.resolve(text, data, depth).map(Some),
            Node::Conditional { test, body } => {
                if test_passes(test, data) {
                    self.resolve(body, data, depth).map(Some)
                } else {
                    Ok(None)
                }
            }
            Node::Repetition {
                array_key,
                separator,
                body,
            } => {
                let found = lookup(data, array_key);
                let items = match found.as_deref() {
                    Some(Value::Array(items)) if !items.is_empty() => items,
                    other => {
                        tracing::debug!(
                            target: "sqlbatis.render",
                            array_key = array_key.as_str(),
                            found = ?other,
                            "repetition skipped: no elements"
                        );
                        return Ok(None);
                    }
                };

                let mut pieces = Vec::with_capacity(items.len());
                for item in items {
                    pieces.push(self.resolve(body, item, depth)?);
                }
                Ok(Some(Fragment::join(pieces, separator)))
            }
        }
    }

    fn resolve(&self, text: &str, data: &Value, depth: usize) -> BatisResult<Fragment> {
        placeholder::resolve(text, data, &mut |key: &str| self.include(key, data, depth))
    }

    /// Render a nested `{{ namespace.key }}` reference one level deeper.
    fn include(&self, key: &str, data: &Value, depth: usize) -> BatisResult<Fragment> {
        let next = depth + 1;
        let limit = self.config.include_depth_limit();
        if next > limit {
            tracing::warn!(
                target: "sqlbatis.render",
                key,
                limit,
                "nested template inclusion too deep"
            );
            return Err(BatisError::RecursionLimitExceeded {
                key: key.to_string(),
                limit,
            });
        }

        let template = self.get_raw(key)?;
        let nested = self.assemble(template, data, next)?;
        match self.config.nested_params {
            NestedParams::Inline => Ok(nested),
            NestedParams::Discard => {
                if nested.param_count() > 0 {
                    tracing::debug!(
                        target: "sqlbatis.render",
                        key,
                        dropped = nested.param_count(),
                        "parameters of nested template discarded"
                    );
                }
                Ok(Fragment::raw(nested.to_sql(self.config.placeholder)))
            }
        }
    }
}

#[cfg(test)]
mod tests;
