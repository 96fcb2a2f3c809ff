use crate::cli::InitArgs;
use std::path::Path;

const CONFIG_TEMPLATE: &str = r#"
version = "1"

# Directory holding one YAML file per namespace, relative to this file.
templates = "sql"

[render]
placeholder = "question"   # question | dollar
max_include_depth = 16
nested_params = "discard"  # discard | inline
"#;

const EXAMPLE_TEMPLATES: &str = r#"
# Render with: sqlbatis render example.search --data data.json
findAll:
  - SELECT * FROM users

search:
  - SELECT * FROM users WHERE
  - name: if
    test: ":name != null"
    sql: AND name = :name
  - name: if
    test: ":minAge >= 18"
    sql: AND age >= :minAge
  - ORDER BY id

byIds:
  - SELECT * FROM users WHERE
  - name: for
    array: ids
    separator: " OR "
    sql: id = :id
"#;

pub fn run(args: InitArgs) -> anyhow::Result<()> {
    write_config(&args.config)?;
    println!("wrote {}", args.config.display());

    let base = args.config.parent().unwrap_or_else(|| Path::new("."));
    let example = base.join("sql").join("example.yml");
    if !example.exists() {
        write_file(&example, EXAMPLE_TEMPLATES)?;
        println!("wrote {}", example.display());
    }
    Ok(())
}

fn write_config(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        anyhow::bail!("refusing to overwrite existing file: {}", path.display());
    }
    write_file(path, CONFIG_TEMPLATE)
}

fn write_file(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                anyhow::anyhow!("failed to create directory {}: {e}", parent.display())
            })?;
        }
    }

    std::fs::write(path, content.trim_start_matches('\n'))
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))
}
