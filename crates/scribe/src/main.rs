//! Command-line interface for the `scribe` transcript search tool.

mod cli;

use std::{env, io, process::ExitCode};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{CommandContext, args::Cli, commands};

/// Environment variable consulted for log filters before `RUST_LOG`.
const LOG_ENV: &str = "SCRIBE_LOG";

/// Builds the log filter from the environment or the verbosity flag.
fn log_filter(verbose: u8) -> EnvFilter {
    let from_env = env::var(LOG_ENV)
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok());
    from_env.unwrap_or_else(|| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        })
    })
}

/// Parses arguments, installs logging and runs the selected command.
fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let ctx = match CommandContext::load(cli.index) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };
    commands::run(cli.command, &ctx)
}
