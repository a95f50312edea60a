//! Implementation of `scribe lines`.

use std::process::ExitCode;

use scribe_index::SessionKey;

use crate::cli::{args::LinesCommand, context::CommandContext, output::output_lines};

/// Prints the lines of one session that contain searched terms.
pub fn run(ctx: &CommandContext, cmd: &LinesCommand) -> ExitCode {
    let key: SessionKey = match cmd.session.parse() {
        Ok(key) => key,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let snapshot = match ctx.snapshot() {
        Ok(s) => s,
        Err(code) => return code,
    };

    if !snapshot.index().contains_session(key) {
        eprintln!("error: session {key} is not indexed");
        return ExitCode::FAILURE;
    }

    let lines = ctx.engine().matching_lines(&snapshot, &cmd.query, key);
    output_lines(&cmd.query, key, &lines, cmd.output.json)
}
