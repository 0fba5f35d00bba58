//! Zipper CLI - Command-line utility that packs a directory tree into a ZIP
//! archive with progress display and compression statistics.

mod cli;
mod commands;
mod error;
mod output;
mod progress;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

/// Log level for a `-v` count; `RUST_LOG` takes precedence.
const fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "error",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level(cli.verbose)));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let formatter = output::create_formatter(cli.json, cli.verbose > 0, cli.quiet);

    match commands::archive::execute(&cli, &*formatter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!("Archive run failed: {err:#}");
            formatter.format_error(&err);
            ExitCode::FAILURE
        }
    }
}
