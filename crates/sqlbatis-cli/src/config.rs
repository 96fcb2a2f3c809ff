use serde::Deserialize;
use sqlbatis::{
    DEFAULT_MAX_INCLUDE_DEPTH, EngineConfig, MAX_INCLUDE_DEPTH_CEILING, NestedParams,
    PlaceholderStyle,
};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub config_dir: PathBuf,
    pub file: ConfigFile,
}

impl ProjectConfig {
    pub fn load(config_path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(config_path).map_err(|e| {
            anyhow::anyhow!(
                "failed to read config file {}: {e}",
                config_path.display()
            )
        })?;

        Self::from_toml(config_path, &raw)
    }

    pub fn from_toml(config_path: &Path, raw: &str) -> anyhow::Result<Self> {
        let config_dir = config_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        let mut file: ConfigFile = toml::from_str(raw).map_err(|e| {
            anyhow::anyhow!(
                "failed to parse config file {}: {e}",
                config_path.display()
            )
        })?;

        file.expand_env()?;
        file.validate()?;

        Ok(Self { config_dir, file })
    }

    /// Configuration used when no config file exists; paths resolve against the CWD.
    pub fn fallback() -> Self {
        Self {
            config_dir: PathBuf::from("."),
            file: ConfigFile::default(),
        }
    }

    pub fn resolve_path(&self, p: impl AsRef<Path>) -> PathBuf {
        let p = p.as_ref();
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.config_dir.join(p)
        }
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.resolve_path(&self.file.templates)
    }

    pub fn engine_config(&self) -> EngineConfig {
        let render = &self.file.render;
        EngineConfig::new()
            .with_placeholder(render.placeholder)
            .with_max_include_depth(render.max_include_depth)
            .with_nested_params(render.nested_params)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,

    #[serde(default = "default_templates")]
    pub templates: String,

    #[serde(default)]
    pub render: RenderConfig,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            templates: default_templates(),
            render: RenderConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub placeholder: PlaceholderStyle,
    #[serde(default = "default_max_include_depth")]
    pub max_include_depth: usize,
    #[serde(default)]
    pub nested_params: NestedParams,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            placeholder: PlaceholderStyle::default(),
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            nested_params: NestedParams::default(),
        }
    }
}

fn default_templates() -> String {
    "sql".to_string()
}

fn default_max_include_depth() -> usize {
    DEFAULT_MAX_INCLUDE_DEPTH
}

impl ConfigFile {
    fn expand_env(&mut self) -> anyhow::Result<()> {
        self.templates = expand_env_vars(&self.templates)?;
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.version.trim() != "1" {
            anyhow::bail!("unsupported config version: {}", self.version);
        }
        if self.templates.trim().is_empty() {
            anyhow::bail!("templates must not be empty");
        }
        if self.render.max_include_depth > MAX_INCLUDE_DEPTH_CEILING {
            anyhow::bail!(
                "render.max_include_depth is too large: {} (max {MAX_INCLUDE_DEPTH_CEILING})",
                self.render.max_include_depth
            );
        }
        Ok(())
    }
}

fn expand_env_vars(input: &str) -> anyhow::Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                anyhow::bail!("unterminated env var reference: ${{{key}}}");
            }
            if key.is_empty() {
                anyhow::bail!("invalid env var reference: ${{}}");
            }

            let v = std::env::var(&key)
                .map_err(|_| anyhow::anyhow!("missing env var for config expansion: {key}"))?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}
