use crate::error::{BatisError, BatisResult};
use crate::template::Template;
use std::collections::HashMap;
use std::sync::Arc;

/// Read-only template storage consumed by the engine.
pub trait TemplateSource {
    /// Template registered as `namespace.key`, if any.
    fn lookup(&self, namespace: &str, key: &str) -> Option<&Template>;

    /// Whether any template is registered under `namespace`.
    fn has_namespace(&self, namespace: &str) -> bool;
}

impl<T: TemplateSource + ?Sized> TemplateSource for &T {
    fn lookup(&self, namespace: &str, key: &str) -> Option<&Template> {
        (**self).lookup(namespace, key)
    }

    fn has_namespace(&self, namespace: &str) -> bool {
        (**self).has_namespace(namespace)
    }
}

impl<T: TemplateSource + ?Sized> TemplateSource for Arc<T> {
    fn lookup(&self, namespace: &str, key: &str) -> Option<&Template> {
        (**self).lookup(namespace, key)
    }

    fn has_namespace(&self, namespace: &str) -> bool {
        (**self).has_namespace(namespace)
    }
}

/// A `namespace.key` address split into its two parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualifiedKey<'a> {
    pub namespace: &'a str,
    pub key: &'a str,
}

impl<'a> QualifiedKey<'a> {
    /// Split at the first `.`. Everything after it is the template key.
    ///
    /// Only a key without any dot is malformed; empty segments parse and
    /// simply miss on lookup.
    pub fn parse(qualified: &'a str) -> BatisResult<Self> {
        match qualified.split_once('.') {
            Some((namespace, key)) => Ok(Self { namespace, key }),
            None => Err(BatisError::KeyFormat(qualified.to_string())),
        }
    }
}

impl std::fmt::Display for QualifiedKey<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.namespace, self.key)
    }
}

/// In-memory templates indexed by namespace, then key.
///
/// Build it once, then share it (e.g. behind an `Arc`) for concurrent reads.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    /// Map of namespace -> (key -> Template)
    namespaces: HashMap<String, HashMap<String, Template>>,
}

impl Registry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one template, replacing any previous one at the same address.
    pub fn insert(
        &mut self,
        namespace: impl Into<String>,
        key: impl Into<String>,
        template: Template,
    ) -> Option<Template> {
        self.namespaces
            .entry(namespace.into())
            .or_default()
            .insert(key.into(), template)
    }

    /// Register a whole namespace. Returns `false` (and keeps the existing one)
    /// if the namespace is already present.
    pub fn insert_namespace(
        &mut self,
        namespace: impl Into<String>,
        templates: HashMap<String, Template>,
    ) -> bool {
        let namespace = namespace.into();
        if self.namespaces.contains_key(&namespace) {
            return false;
        }
        self.namespaces.insert(namespace, templates);
        true
    }

    /// Get a template by namespace and key.
    pub fn get(&self, namespace: &str, key: &str) -> Option<&Template> {
        self.namespaces
            .get(namespace)
            .and_then(|by_key| by_key.get(key))
    }

    /// All namespaces, sorted.
    pub fn namespaces(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.namespaces.keys().map(String::as_str).collect();
        out.sort_unstable();
        out
    }

    /// Keys registered under `namespace`, sorted.
    pub fn keys(&self, namespace: &str) -> Vec<&str> {
        let mut out: Vec<&str> = self
            .namespaces
            .get(namespace)
            .map(|by_key| by_key.keys().map(String::as_str).collect())
            .unwrap_or_default();
        out.sort_unstable();
        out
    }

    /// Every `namespace.key`, sorted.
    pub fn qualified_keys(&self) -> Vec<String> {
        self.namespaces()
            .into_iter()
            .flat_map(|ns| self.keys(ns).into_iter().map(move |k| format!("{ns}.{k}")))
            .collect()
    }

    /// Get the number of registered templates.
    pub fn len(&self) -> usize {
        self.namespaces.values().map(|by_key| by_key.len()).sum()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.namespaces.values().all(|by_key| by_key.is_empty())
    }
}

impl TemplateSource for Registry {
    fn lookup(&self, namespace: &str, key: &str) -> Option<&Template> {
        self.get(namespace, key)
    }

    fn has_namespace(&self, namespace: &str) -> bool {
        self.namespaces.contains_key(namespace)
    }
}
