mod cli;
mod config;
mod init;
mod inspect;
mod render;
mod workspace;

pub fn run(args: Vec<String>) -> anyhow::Result<()> {
    let cli::Invocation { verbose, command } = cli::parse_args(&args)?;
    if verbose {
        init_tracing();
    }

    match command {
        cli::Command::Help(topic) => {
            cli::print_help(topic);
            Ok(())
        }
        cli::Command::Render(args) => render::run(args),
        cli::Command::Show(args) => inspect::show(args),
        cli::Command::List(args) => inspect::list(args),
        cli::Command::Init(args) => init::run(args),
    }
}

/// Log to stderr; `RUST_LOG` overrides the default `sqlbatis=trace`.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sqlbatis=trace"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
