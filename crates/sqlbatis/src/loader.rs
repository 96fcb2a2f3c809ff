//! Template definitions read from YAML files.
//!
//! Each file under the template directory is one namespace, named after the
//! file stem. The file is a mapping from template key to a list of nodes:
//!
//! ```yaml
//! findAll:
//!   - SELECT * FROM users
//! search:
//!   - SELECT * FROM users WHERE
//!   - name: if
//!     test: ":name != null"
//!     sql: AND name = :name
//!   - name: for
//!     array: ids
//!     separator: " OR "
//!     sql: id = :id
//!   - ORDER BY id
//! ```
//!
//! A template may also be a single string. `seperator` is accepted as an
//! alias of `separator`.

use crate::error::{BatisError, BatisResult};
use crate::registry::Registry;
use crate::template::{Node, Template};
use serde_yaml::{Mapping, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const EXTENSIONS: [&str; 2] = ["yml", "yaml"];

/// Load every `*.yml` / `*.yaml` file directly under `dir` into a registry.
pub fn load_dir(dir: impl AsRef<Path>) -> BatisResult<Registry> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(BatisError::load(format!(
            "template directory not found: {}",
            dir.display()
        )));
    }

    let mut registry = Registry::new();
    for path in template_files(dir)? {
        let (namespace, templates) = load_file(&path)?;
        tracing::debug!(
            target: "sqlbatis.render",
            namespace = namespace.as_str(),
            templates = templates.len(),
            file = %path.display(),
            "loaded namespace"
        );
        if !registry.insert_namespace(namespace.clone(), templates) {
            return Err(BatisError::load(format!(
                "{}: namespace `{namespace}` is already defined",
                path.display()
            )));
        }
    }
    Ok(registry)
}

/// Parse one file; the namespace is the file stem.
pub fn load_file(path: &Path) -> BatisResult<(String, HashMap<String, Template>)> {
    let namespace = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty() && !s.contains('.'))
        .ok_or_else(|| {
            BatisError::load(format!("{}: invalid namespace file name", path.display()))
        })?
        .to_string();

    let content = std::fs::read_to_string(path)?;
    let origin = path.display().to_string();
    let templates = parse_namespace(&origin, &content)?;
    Ok((namespace, templates))
}

/// Parse the YAML text of one namespace. `origin` only appears in errors.
pub fn parse_namespace(origin: &str, content: &str) -> BatisResult<HashMap<String, Template>> {
    let doc: Value = serde_yaml::from_str(content)
        .map_err(|e| BatisError::load(format!("{origin}: invalid YAML: {e}")))?;

    let entries = match doc {
        Value::Mapping(m) => m,
        Value::Null => return Ok(HashMap::new()),
        other => {
            return Err(BatisError::load(format!(
                "{origin}: expected a mapping of template keys, found {}",
                type_name(&other)
            )));
        }
    };

    let mut templates = HashMap::with_capacity(entries.len());
    for (key, body) in entries {
        let key = match key {
            Value::String(s) if !s.is_empty() => s,
            other => {
                return Err(BatisError::load(format!(
                    "{origin}: template keys must be non-empty strings, found {}",
                    type_name(&other)
                )));
            }
        };
        let template = parse_template(&body)
            .map_err(|msg| BatisError::load(format!("{origin}: template `{key}`: {msg}")))?;
        templates.insert(key, template);
    }
    Ok(templates)
}

fn template_files(dir: &Path) -> BatisResult<Vec<PathBuf>> {
    let base = glob::Pattern::escape(&dir.to_string_lossy());
    let mut files = Vec::new();
    for ext in EXTENSIONS {
        let pattern = format!("{base}/*.{ext}");
        let entries = glob::glob(&pattern)
            .map_err(|e| BatisError::load(format!("invalid glob {pattern}: {e}")))?;
        for entry in entries {
            let path = entry.map_err(|e| BatisError::load(e.to_string()))?;
            if path.is_file() && !is_swap_file(&path) {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Editor leftovers such as `.user.yml.swp` or `.#user.yml`.
fn is_swap_file(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    name.starts_with('.') || name.contains(".swp")
}

fn parse_template(body: &Value) -> Result<Template, String> {
    match body {
        Value::String(s) => Ok(Template::new(vec![Node::literal(s.as_str())])),
        Value::Sequence(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| parse_node(item).map_err(|msg| format!("node {}: {msg}", i + 1)))
            .collect(),
        other => Err(format!(
            "expected a list of nodes, found {}",
            type_name(other)
        )),
    }
}

fn parse_node(item: &Value) -> Result<Node, String> {
    let map = match item {
        Value::Mapping(map) => map,
        Value::Null => return Err("empty node".to_string()),
        scalar => return scalar_text(scalar).map(Node::literal),
    };

    let name = required(map, "name")?;
    match name.to_ascii_lowercase().as_str() {
        "if" => Ok(Node::conditional(required(map, "test")?, required(map, "sql")?)),
        "for" => {
            let separator = match optional(map, "separator")? {
                Some(sep) => sep,
                None => optional(map, "seperator")?.unwrap_or_default(),
            };
            Ok(Node::repetition(
                required(map, "array")?,
                separator,
                required(map, "sql")?,
            ))
        }
        _ => Err(format!("unknown directive `{name}` (expected `if` or `for`)")),
    }
}

fn required(map: &Mapping, field: &str) -> Result<String, String> {
    optional(map, field)?.ok_or_else(|| format!("missing field `{field}`"))
}

fn optional(map: &Mapping, field: &str) -> Result<Option<String>, String> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => scalar_text(v)
            .map(Some)
            .map_err(|msg| format!("field `{field}`: {msg}")),
    }
}

fn scalar_text(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(format!("expected text, found {}", type_name(other))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
