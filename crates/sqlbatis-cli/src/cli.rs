use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Render,
    Show,
    List,
    Init,
}

#[derive(Debug, Clone)]
pub struct Invocation {
    pub verbose: bool,
    pub command: Command,
}

#[derive(Debug, Clone)]
pub enum Command {
    Help(HelpTopic),
    Render(RenderArgs),
    Show(ShowArgs),
    List(ListArgs),
    Init(InitArgs),
}

/// Where templates come from: a config file, optionally overridden by `--templates`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceArgs {
    pub config: PathBuf,
    pub templates: Option<PathBuf>,
}

impl Default for SourceArgs {
    fn default() -> Self {
        Self {
            config: PathBuf::from("sqlbatis.toml"),
            templates: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Stdin,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct RenderArgs {
    pub source: SourceArgs,
    pub key: String,
    pub data: Option<DataSource>,
    pub json: bool,
}

#[derive(Debug, Clone)]
pub struct ShowArgs {
    pub source: SourceArgs,
    pub key: String,
    pub json: bool,
}

#[derive(Debug, Clone)]
pub struct ListArgs {
    pub source: SourceArgs,
}

#[derive(Debug, Clone)]
pub struct InitArgs {
    pub config: PathBuf,
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Invocation> {
    let verbose = args
        .iter()
        .skip(1)
        .any(|a| a == "-v" || a == "--verbose");
    let mut it = args
        .iter()
        .skip(1)
        .map(|s| s.as_str())
        .filter(|a| *a != "-v" && *a != "--verbose");

    let command = match it.next() {
        None | Some("-h" | "--help") => Command::Help(HelpTopic::Root),
        Some("render") => parse_render(it)?,
        Some("show") => parse_show(it)?,
        Some("list") => parse_list(it)?,
        Some("init") => parse_init(it)?,
        Some(other) => anyhow::bail!("unknown command: {other}"),
    };

    Ok(Invocation { verbose, command })
}

/// Handle `--config` / `--templates`; returns `false` if `token` is not one of them.
fn parse_source_flag<'a>(
    token: &'a str,
    it: &mut impl Iterator<Item = &'a str>,
    source: &mut SourceArgs,
) -> anyhow::Result<bool> {
    match token {
        "--config" => {
            let Some(v) = it.next() else {
                anyhow::bail!("--config requires a value");
            };
            source.config = PathBuf::from(v);
        }
        _ if token.starts_with("--config=") => {
            source.config = PathBuf::from(token.trim_start_matches("--config="));
        }
        "--templates" => {
            let Some(v) = it.next() else {
                anyhow::bail!("--templates requires a value");
            };
            source.templates = Some(PathBuf::from(v));
        }
        _ if token.starts_with("--templates=") => {
            source.templates = Some(PathBuf::from(token.trim_start_matches("--templates=")));
        }
        _ => return Ok(false),
    }
    Ok(true)
}

fn parse_data(value: &str) -> DataSource {
    if value == "-" {
        DataSource::Stdin
    } else {
        DataSource::File(PathBuf::from(value))
    }
}

fn parse_render<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut source = SourceArgs::default();
    let mut key: Option<String> = None;
    let mut data: Option<DataSource> = None;
    let mut json = false;

    while let Some(token) = it.next() {
        if parse_source_flag(token, &mut it, &mut source)? {
            continue;
        }
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Render)),
            "--json" => json = true,
            "--data" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--data requires a value (file path or `-` for stdin)");
                };
                data = Some(parse_data(v));
            }
            _ if token.starts_with("--data=") => {
                data = Some(parse_data(token.trim_start_matches("--data=")));
            }
            _ if token.starts_with('-') => anyhow::bail!("unknown argument: {token}"),
            _ if key.is_none() => key = Some(token.to_string()),
            other => anyhow::bail!("unexpected argument: {other}"),
        }
    }

    let Some(key) = key else {
        anyhow::bail!("missing template key (usage: sqlbatis render <NAMESPACE.KEY>)");
    };

    Ok(Command::Render(RenderArgs {
        source,
        key,
        data,
        json,
    }))
}

fn parse_show<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut source = SourceArgs::default();
    let mut key: Option<String> = None;
    let mut json = false;

    while let Some(token) = it.next() {
        if parse_source_flag(token, &mut it, &mut source)? {
            continue;
        }
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Show)),
            "--json" => json = true,
            _ if token.starts_with('-') => anyhow::bail!("unknown argument: {token}"),
            _ if key.is_none() => key = Some(token.to_string()),
            other => anyhow::bail!("unexpected argument: {other}"),
        }
    }

    let Some(key) = key else {
        anyhow::bail!("missing template key (usage: sqlbatis show <NAMESPACE.KEY>)");
    };

    Ok(Command::Show(ShowArgs { source, key, json }))
}

fn parse_list<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut source = SourceArgs::default();

    while let Some(token) = it.next() {
        if parse_source_flag(token, &mut it, &mut source)? {
            continue;
        }
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::List)),
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    Ok(Command::List(ListArgs { source }))
}

fn parse_init<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut config = PathBuf::from("sqlbatis.toml");

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Init)),
            "--config" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--config requires a value");
                };
                config = PathBuf::from(v);
            }
            _ if token.starts_with("--config=") => {
                config = PathBuf::from(token.trim_start_matches("--config="));
            }
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    Ok(Command::Init(InitArgs { config }))
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
sqlbatis - render dynamic SQL templates

USAGE:
  sqlbatis <COMMAND> [OPTIONS]

COMMANDS:
  render        Render a template against JSON data
  show          Print the raw nodes of a template
  list          List every namespace.key
  init          Write a starter sqlbatis.toml and template directory

GLOBAL OPTIONS:
  -v, --verbose         Log rendering decisions to stderr (RUST_LOG overrides)
  -h, --help            Print help

Run `sqlbatis <command> --help` for more."
            );
        }
        HelpTopic::Render => {
            println!(
                "\
USAGE:
  sqlbatis render <NAMESPACE.KEY> [OPTIONS]

OPTIONS:
  --data <FILE>         JSON data context (`-` reads stdin; default: {{}})
  --json                Print {{\"sql\": ..., \"params\": [...]}} as JSON
  --config <FILE>       Config file path (default: sqlbatis.toml)
  --templates <DIR>     Override the template directory from config
  -h, --help            Print help"
            );
        }
        HelpTopic::Show => {
            println!(
                "\
USAGE:
  sqlbatis show <NAMESPACE.KEY> [OPTIONS]

OPTIONS:
  --json                Print the nodes as JSON
  --config <FILE>       Config file path (default: sqlbatis.toml)
  --templates <DIR>     Override the template directory from config
  -h, --help            Print help"
            );
        }
        HelpTopic::List => {
            println!(
                "\
USAGE:
  sqlbatis list [OPTIONS]

OPTIONS:
  --config <FILE>       Config file path (default: sqlbatis.toml)
  --templates <DIR>     Override the template directory from config
  -h, --help            Print help"
            );
        }
        HelpTopic::Init => {
            println!(
                "\
USAGE:
  sqlbatis init [OPTIONS]

OPTIONS:
  --config <FILE>       Config file path to create (default: sqlbatis.toml)
  -h, --help            Print help"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("sqlbatis")
            .chain(list.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn no_args_prints_root_help() {
        let inv = parse_args(&args(&[])).unwrap();
        assert!(!inv.verbose);
        assert!(matches!(inv.command, Command::Help(HelpTopic::Root)));
    }

    #[test]
    fn parse_render_with_data_and_json() {
        let inv = parse_args(&args(&[
            "render",
            "user.search",
            "--data",
            "data.json",
            "--json",
            "--config=conf/sqlbatis.toml",
            "--verbose",
        ]))
        .unwrap();
        assert!(inv.verbose);

        let Command::Render(render) = inv.command else {
            panic!("expected render");
        };
        assert_eq!(render.key, "user.search");
        assert_eq!(render.data, Some(DataSource::File(PathBuf::from("data.json"))));
        assert!(render.json);
        assert_eq!(render.source.config, PathBuf::from("conf/sqlbatis.toml"));
        assert_eq!(render.source.templates, None);
    }

    #[test]
    fn parse_render_reads_stdin_on_dash() {
        let inv = parse_args(&args(&["render", "user.find", "--data", "-"])).unwrap();
        let Command::Render(render) = inv.command else {
            panic!("expected render");
        };
        assert_eq!(render.data, Some(DataSource::Stdin));
        assert!(!render.json);
    }

    #[test]
    fn parse_render_requires_key() {
        let err = parse_args(&args(&["render", "--json"])).unwrap_err();
        assert!(err.to_string().contains("missing template key"));
    }

    #[test]
    fn parse_show_and_list_with_template_override() {
        let inv = parse_args(&args(&["show", "--templates", "sql", "user.find"])).unwrap();
        let Command::Show(show) = inv.command else {
            panic!("expected show");
        };
        assert_eq!(show.key, "user.find");
        assert_eq!(show.source.templates, Some(PathBuf::from("sql")));

        let inv = parse_args(&args(&["list", "--templates=db/sql"])).unwrap();
        let Command::List(list) = inv.command else {
            panic!("expected list");
        };
        assert_eq!(list.source.templates, Some(PathBuf::from("db/sql")));
        assert_eq!(list.source.config, PathBuf::from("sqlbatis.toml"));
    }

    #[test]
    fn subcommand_help() {
        let inv = parse_args(&args(&["render", "--help"])).unwrap();
        assert!(matches!(inv.command, Command::Help(HelpTopic::Render)));
        let inv = parse_args(&args(&["init", "-h"])).unwrap();
        assert!(matches!(inv.command, Command::Help(HelpTopic::Init)));
    }

    #[test]
    fn rejects_unknown_input() {
        assert!(parse_args(&args(&["explain"])).is_err());
        assert!(parse_args(&args(&["list", "--bogus"])).is_err());
        assert!(parse_args(&args(&["render", "a.b", "c.d"])).is_err());
        assert!(parse_args(&args(&["render", "a.b", "--data"])).is_err());
    }
}
