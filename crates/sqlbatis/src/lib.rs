//! # sqlbatis
//!
//! Dynamic SQL templates rendered into parameterized statements.
//!
//! ## Features
//!
//! - **Named templates**: every template lives at `namespace.key`
//! - **Conditional fragments**: include a piece of SQL only when a test expression holds
//! - **Repetition**: expand a fragment once per element of an array, joined by a separator
//! - **Bound parameters**: `:name` becomes a marker (`?` or `$n`) and its value is bound
//! - **Literal substitution**: `::name` inlines a value as text (identifiers, sort keys)
//! - **Composition**: `{{ namespace.key }}` inlines another template, with a depth bound
//! - **WHERE cleanup**: dangling `WHERE` / `WHERE AND` left by omitted fragments is removed
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//! use sqlbatis::{Engine, Node, Registry, Template};
//!
//! let mut registry = Registry::new();
//! registry.insert(
//!     "order",
//!     "byIds",
//!     Template::new(vec![
//!         Node::literal("SELECT * FROM orders WHERE"),
//!         Node::repetition("ids", " OR ", "id = :id"),
//!     ]),
//! );
//!
//! let engine = Engine::new(registry);
//! let out = engine.get("order.byIds", &json!({ "ids": [1, 2] })).unwrap();
//! assert_eq!(out.sql, "SELECT * FROM orders WHERE id = ? OR id = ?");
//! assert_eq!(out.params, vec![json!(1), json!(2)]);
//! ```
//!
//! With the `loader` feature (on by default), [`loader::load_dir`] builds a
//! [`Registry`] from a directory of YAML files, one namespace per file.

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod expr;
pub mod fragment;
pub mod normalize;
pub mod placeholder;
pub mod registry;
pub mod template;

#[cfg(feature = "loader")]
pub mod loader;

pub use config::{
    DEFAULT_MAX_INCLUDE_DEPTH, EngineConfig, MAX_INCLUDE_DEPTH_CEILING, NestedParams,
    PlaceholderStyle,
};
pub use context::DataContext;
pub use engine::{Engine, RenderedSql};
pub use error::{BatisError, BatisResult};
pub use fragment::Fragment;
pub use normalize::normalize_clauses;
pub use registry::{QualifiedKey, Registry, TemplateSource};
pub use template::{Node, Template};

#[cfg(feature = "loader")]
pub use loader::{load_dir, parse_namespace};
