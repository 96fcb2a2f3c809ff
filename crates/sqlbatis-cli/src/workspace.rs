use crate::cli::SourceArgs;
use crate::config::ProjectConfig;
use sqlbatis::{Engine, load_dir};

/// Load the config (if any) and every template it points at.
///
/// A missing config file is only tolerated when `--templates` names the
/// directory explicitly.
pub fn open_engine(source: &SourceArgs) -> anyhow::Result<Engine> {
    let project = if source.config.exists() {
        ProjectConfig::load(&source.config)?
    } else if source.templates.is_some() {
        ProjectConfig::fallback()
    } else {
        anyhow::bail!(
            "config file not found: {} (run `sqlbatis init` or pass --templates <DIR>)",
            source.config.display()
        );
    };

    let dir = match &source.templates {
        Some(dir) => dir.clone(),
        None => project.templates_dir(),
    };

    let registry = load_dir(&dir)
        .map_err(|e| anyhow::anyhow!("failed to load templates from {}: {e}", dir.display()))?;
    tracing::debug!(
        target: "sqlbatis.cli",
        dir = %dir.display(),
        templates = registry.len(),
        "templates loaded"
    );

    Ok(Engine::with_config(registry, project.engine_config()))
}
