use serde::Deserialize;

/// Default bound on nested `{{ namespace.key }}` inclusion depth.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 16;

/// Hard upper bound on the inclusion depth. Larger settings are clamped so a
/// cyclic template graph fails with an error on a default 2 MiB thread stack.
pub const MAX_INCLUDE_DEPTH_CEILING: usize = 128;

/// How bound-parameter markers are written into the final SQL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderStyle {
    /// `?` for every parameter (MySQL / SQLite drivers).
    #[default]
    Question,
    /// `$1, $2, ...` numbered over the whole statement (PostgreSQL).
    Dollar,
}

/// What happens to parameters bound inside a nested template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NestedParams {
    /// Inline only the nested SQL text and drop its parameters.
    ///
    /// Markers from the nested template stay in the text without values, so
    /// nested templates should not bind parameters under this policy.
    #[default]
    Discard,
    /// Splice the nested markers and parameters into the outer statement.
    Inline,
}

/// Rendering options for an [`Engine`](crate::Engine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum nested inclusion depth. Top-level rendering is depth 0.
    /// Values above [`MAX_INCLUDE_DEPTH_CEILING`] are treated as the ceiling.
    pub max_include_depth: usize,
    /// Marker style for bound parameters.
    pub placeholder: PlaceholderStyle,
    /// Nested-template parameter policy.
    pub nested_params: NestedParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            placeholder: PlaceholderStyle::default(),
            nested_params: NestedParams::default(),
        }
    }
}

impl EngineConfig {
    /// Create a configuration with defaults (`?` markers, depth 16, discard nested params).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum nested inclusion depth, clamped to [`MAX_INCLUDE_DEPTH_CEILING`].
    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth.min(MAX_INCLUDE_DEPTH_CEILING);
        self
    }

    /// The depth bound the engine enforces.
    pub fn include_depth_limit(&self) -> usize {
        self.max_include_depth.min(MAX_INCLUDE_DEPTH_CEILING)
    }

    /// Set the placeholder marker style.
    pub fn with_placeholder(mut self, style: PlaceholderStyle) -> Self {
        self.placeholder = style;
        self
    }

    /// Set the nested-template parameter policy.
    pub fn with_nested_params(mut self, policy: NestedParams) -> Self {
        self.nested_params = policy;
        self
    }
}
