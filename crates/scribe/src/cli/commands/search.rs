//! Implementation of `scribe search`.

use std::process::ExitCode;

use tracing::warn;

use crate::cli::{args::SearchCommand, context::CommandContext, output::output_sessions};

/// Lists sessions in the persisted index that match the query.
pub fn run(ctx: &CommandContext, cmd: &SearchCommand) -> ExitCode {
    let engine = ctx.engine();
    if let Err(e) = engine.parser().try_parse(&cmd.query) {
        warn!("query recovered leniently: {}", e.format_with_context());
    }

    let snapshot = match ctx.snapshot() {
        Ok(s) => s,
        Err(code) => return code,
    };

    let sessions = engine.matching_sessions(&snapshot, &cmd.query);
    output_sessions(&cmd.query, &sessions, cmd.output.json)
}
