//! tagdb entry point.

use clap::Parser;
use std::process::ExitCode;
use tagdb::cli::commands;
use tagdb::cli::{Action, Cli};
use tagdb::config::LogLevel;
use tagdb::error::Error;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    init_tracing(cli.log);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                eprintln!("{}", e.to_structured_json());
            } else if let Some(hint) = e.hint() {
                eprintln!("Error: {e}\n  Hint: {hint}");
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::from(e.exit_code())
        }
    }
}

/// Install the log subscriber.
///
/// `RUST_LOG` wins over `--log`; with neither, nothing is logged.
fn init_tracing(level: Option<LogLevel>) {
    use tracing_subscriber::EnvFilter;

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if let Some(level) = level {
        EnvFilter::new(level.directive())
    } else {
        return;
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli) -> Result<(), Error> {
    match cli.action {
        Action::Import => commands::import::execute(cli, cli.json),
        Action::Export => commands::export::execute(cli, cli.json),
    }
}
