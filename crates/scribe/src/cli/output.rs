//! Rendering and JSON serialization for CLI output.

use std::{
    io::{self, IsTerminal},
    process::ExitCode,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use scribe_index::{BuildKind, BuildSummary, LineMatch, SessionKey};
use serde::Serialize;

/// ANSI escape codes used for terminal styling.
mod colors {
    /// Bold text.
    pub const BOLD: &str = "\x1b[1m";
    /// Yellow text.
    pub const YELLOW: &str = "\x1b[33m";
    /// Dim text.
    pub const DIM: &str = "\x1b[2m";
    /// Reset all formatting.
    pub const RESET: &str = "\x1b[0m";
}

/// Wraps `text` in `style` when stdout is a terminal.
fn styled(style: &str, text: &str) -> String {
    if io::stdout().is_terminal() {
        format!("{style}{text}{}", colors::RESET)
    } else {
        text.to_string()
    }
}

/// Formats text as a subheader (bold).
pub fn subheader(text: &str) -> String {
    styled(colors::BOLD, text)
}

/// Formats text as dimmed/less important.
pub fn dim(text: &str) -> String {
    styled(colors::DIM, text)
}

/// Formats text as a warning (yellow).
pub fn warning(text: &str) -> String {
    styled(colors::YELLOW, text)
}

/// JSON output for `scribe search`.
#[derive(Serialize)]
struct JsonSessions<'a> {
    /// The query as typed.
    query: &'a str,
    /// Matching session keys in `year-id` form.
    sessions: Vec<String>,
    /// Number of matching sessions.
    total_matches: usize,
}

/// JSON output for `scribe lines`.
#[derive(Serialize)]
struct JsonLines<'a> {
    /// Session the lines belong to.
    session: String,
    /// The query as typed.
    query: &'a str,
    /// Matching lines in playback order.
    lines: &'a [LineMatch],
}

/// Prints `value` as pretty JSON.
fn print_json(value: &impl Serialize) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize output: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Prints matching sessions, one key per line.
pub fn output_sessions(query: &str, sessions: &[SessionKey], json: bool) -> ExitCode {
    if json {
        return print_json(&JsonSessions {
            query,
            sessions: sessions.iter().map(ToString::to_string).collect(),
            total_matches: sessions.len(),
        });
    }

    if sessions.is_empty() {
        println!("{}", dim("No matching sessions."));
    }
    for key in sessions {
        println!("{key}");
    }
    ExitCode::SUCCESS
}

/// Prints matching lines as `label  text`.
pub fn output_lines(query: &str, session: SessionKey, lines: &[LineMatch], json: bool) -> ExitCode {
    if json {
        return print_json(&JsonLines {
            session: session.to_string(),
            query,
            lines,
        });
    }

    let width = lines.iter().map(|l| l.label.len()).max().unwrap_or(0);
    for line in lines {
        println!("{}  {}", dim(&format!("{:>width$}", line.label)), line.text);
    }
    ExitCode::SUCCESS
}

/// Prints the result of a successful build.
pub fn output_build_summary(summary: &BuildSummary) {
    let kind = match summary.kind {
        BuildKind::Full => "built",
        BuildKind::Incremental => "updated",
    };
    println!(
        "Index {kind}: {} sessions indexed, {} in index {}",
        summary.report.indexed,
        summary.session_count,
        dim(&format!("({})", format_elapsed(summary.elapsed)))
    );

    if !summary.report.is_clean() {
        println!();
        println!("{}", subheader("Skipped:"));
        for skipped in &summary.report.skipped {
            println!("   {}", warning(&skipped.to_string()));
        }
    }
}

/// Formats a build duration for display.
pub fn format_elapsed(elapsed: Duration) -> String {
    if elapsed.as_secs() > 0 {
        format!("{:.1}s", elapsed.as_secs_f64())
    } else {
        format!("{}ms", elapsed.as_millis())
    }
}

/// Formats a timestamp as seconds since the Unix epoch.
pub fn format_timestamp(time: SystemTime) -> String {
    time.duration_since(UNIX_EPOCH)
        .map_or_else(|_| "unknown".to_string(), |d| format!("{}", d.as_secs()))
}
