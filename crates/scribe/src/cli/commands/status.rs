//! Implementation of `scribe status`.

use std::process::ExitCode;

use scribe_config::discover_config_files;
use scribe_index::{IndexStatus, detect_index_status};

use crate::cli::{
    context::CommandContext,
    output::{dim, format_timestamp, subheader, warning},
};

/// Shows configuration files, index location and status, and validation warnings.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let config_files = discover_config_files(&ctx.cwd);
    println!("{}", subheader("Config files:"));
    if config_files.is_empty() {
        println!("   {}", dim("(none, using defaults)"));
    }
    for path in &config_files {
        println!("   {}", path.display());
    }
    println!();

    let store = ctx.store();
    let status = detect_index_status(&store);
    println!("{}", subheader("Index:"));
    println!("   {}", store.path().display());
    println!("   status: {}", status.description());
    if status == IndexStatus::Current
        && let Ok(snapshot) = store.load()
    {
        println!("   sessions: {}", snapshot.session_count());
        println!("   built: {}", dim(&format_timestamp(snapshot.built_at())));
    }

    let warnings = ctx.config.validate();
    if !warnings.is_empty() {
        println!();
        println!("{}", subheader("Warnings:"));
        for w in &warnings {
            println!("   {}", warning(&w.to_string()));
        }
    }

    ExitCode::SUCCESS
}
