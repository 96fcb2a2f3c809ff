use crate::cli::{DataSource, RenderArgs};
use crate::workspace::open_engine;
use serde_json::Value;
use sqlbatis::RenderedSql;
use std::io::Read;

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let engine = open_engine(&args.source)?;
    let data = read_data(args.data.as_ref())?;

    let rendered = engine
        .get(&args.key, &data)
        .map_err(|e| anyhow::anyhow!("failed to render {}: {e}", args.key))?;

    println!("{}", format_rendered(&rendered, args.json)?);
    Ok(())
}

fn read_data(source: Option<&DataSource>) -> anyhow::Result<Value> {
    let (raw, origin) = match source {
        None => return Ok(Value::Object(Default::default())),
        Some(DataSource::Stdin) => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .map_err(|e| anyhow::anyhow!("failed to read data from stdin: {e}"))?;
            (raw, "stdin".to_string())
        }
        Some(DataSource::File(path)) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("failed to read data file {}: {e}", path.display()))?;
            (raw, path.display().to_string())
        }
    };
    parse_data(&raw, &origin)
}

/// Blank input counts as an empty object.
fn parse_data(raw: &str, origin: &str) -> anyhow::Result<Value> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    let data: Value = serde_json::from_str(raw)
        .map_err(|e| anyhow::anyhow!("invalid JSON data in {origin}: {e}"))?;
    match data {
        Value::Object(_) | Value::Null => Ok(data),
        _ => anyhow::bail!("data in {origin} must be a JSON object"),
    }
}

fn format_rendered(rendered: &RenderedSql, json: bool) -> anyhow::Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(rendered)?);
    }

    let mut out = rendered.sql.clone();
    for (i, param) in rendered.params.iter().enumerate() {
        out.push_str(&format!("\n-- ${}: {}", i + 1, param));
    }
    Ok(out)
}
