//! Implementation of `scribe index`.

use std::{fs, path::Path, process::ExitCode};

use scribe_index::SessionTranscript;
use tracing::info;

use crate::cli::{args::IndexCommand, context::CommandContext, output::output_build_summary};

/// Reads a JSON array of transcripts.
fn read_transcripts(path: &Path) -> Result<Vec<SessionTranscript>, ExitCode> {
    let contents = fs::read_to_string(path).map_err(|e| {
        eprintln!("error: failed to read {}: {e}", path.display());
        ExitCode::FAILURE
    })?;
    serde_json::from_str(&contents).map_err(|e| {
        eprintln!("error: invalid transcript file {}: {e}", path.display());
        ExitCode::FAILURE
    })
}

/// Builds the index in the background and waits for it to finish.
pub fn run(ctx: &CommandContext, cmd: &IndexCommand) -> ExitCode {
    let transcripts = match read_transcripts(&cmd.file) {
        Ok(t) => t,
        Err(code) => return code,
    };
    info!(
        count = transcripts.len(),
        file = %cmd.file.display(),
        "loaded transcripts"
    );

    let service = match ctx.service() {
        Ok(s) => s,
        Err(code) => return code,
    };

    let handle = if cmd.update {
        service.update(transcripts)
    } else {
        service.run(transcripts)
    };

    match handle.wait() {
        Ok(summary) => {
            output_build_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: indexing failed: {e}");
            ExitCode::FAILURE
        }
    }
}
