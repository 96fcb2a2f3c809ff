use crate::cli::{ListArgs, ShowArgs};
use crate::workspace::open_engine;
use sqlbatis::Template;

pub fn show(args: ShowArgs) -> anyhow::Result<()> {
    let engine = open_engine(&args.source)?;
    let template = engine
        .get_raw(&args.key)
        .map_err(|e| anyhow::anyhow!("failed to look up {}: {e}", args.key))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(template)?);
    } else {
        println!("{}", describe(template));
    }
    Ok(())
}

pub fn list(args: ListArgs) -> anyhow::Result<()> {
    let engine = open_engine(&args.source)?;
    for key in engine.source().qualified_keys() {
        println!("{key}");
    }
    Ok(())
}

/// One line per node, numbered.
fn describe(template: &Template) -> String {
    template
        .iter()
        .enumerate()
        .map(|(i, node)| format!("{:>3}  {node}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}
