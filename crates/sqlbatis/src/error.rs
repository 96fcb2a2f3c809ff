//! Error types for sqlbatis

use thiserror::Error;

/// Result type alias for sqlbatis operations
pub type BatisResult<T> = Result<T, BatisError>;

/// Error types for template lookup, rendering and loading
#[derive(Debug, Error)]
pub enum BatisError {
    /// Qualified key is not of the form `namespace.key`
    #[error("Key format error: {0} (expected `namespace.key`)")]
    KeyFormat(String),

    /// No templates are registered under the namespace
    #[error("Namespace not found: {0}")]
    NamespaceNotFound(String),

    /// The namespace exists but does not contain the key
    #[error("Template not found: {namespace}.{key}")]
    TemplateNotFound { namespace: String, key: String },

    /// Nested `{{ namespace.key }}` inclusion went deeper than the configured bound
    #[error("Recursion limit exceeded while including '{key}' (limit: {limit})")]
    RecursionLimitExceeded { key: String, limit: usize },

    /// Template definition files could not be loaded
    #[error("Load error: {0}")]
    Load(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl BatisError {
    /// Create a template-not-found error
    pub fn template_not_found(namespace: impl Into<String>, key: impl Into<String>) -> Self {
        Self::TemplateNotFound {
            namespace: namespace.into(),
            key: key.into(),
        }
    }

    /// Create a load error
    pub fn load(message: impl Into<String>) -> Self {
        Self::Load(message.into())
    }

    /// Check if this is a key format error
    pub fn is_key_format(&self) -> bool {
        matches!(self, Self::KeyFormat(_))
    }

    /// Check if this is a lookup miss (namespace or template)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NamespaceNotFound(_) | Self::TemplateNotFound { .. }
        )
    }

    /// Check if this is a recursion limit error
    pub fn is_recursion_limit(&self) -> bool {
        matches!(self, Self::RecursionLimitExceeded { .. })
    }
}
