//! Clap argument definitions for the `scribe` CLI.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "scribe")]
#[command(about = "Search session transcripts by keyword and qualifier")]
pub struct Cli {
    /// Index directory, overriding the configured location
    #[arg(long, global = true, value_name = "DIR")]
    pub index: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format flags shared by query commands.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct OutputArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `scribe index`.
#[derive(Args, Debug, Clone)]
pub struct IndexCommand {
    /// JSON file containing an array of session transcripts
    pub file: PathBuf,

    /// Merge into the existing index instead of rebuilding it
    #[arg(long)]
    pub update: bool,
}

/// Arguments for `scribe search`.
#[derive(Args, Debug, Clone)]
pub struct SearchCommand {
    /// Query string, e.g. `year:2015 swift concurrency`
    pub query: String,

    /// Output options.
    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for `scribe lines`.
#[derive(Args, Debug, Clone)]
pub struct LinesCommand {
    /// Session key in `year-id` form, e.g. `2015-101`
    pub session: String,

    /// Query string
    pub query: String,

    /// Output options.
    #[command(flatten)]
    pub output: OutputArgs,
}

/// Supported `scribe` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Build the index from a transcript file
    #[command(after_help = "\
INPUT FORMAT:
  [
    {\"year\": 2015, \"session_id\": 101, \"track\": \"Frameworks\",
     \"lines\": [{\"text\": \"Hello\", \"timecode\": 3.5}]}
  ]")]
    Index(IndexCommand),

    /// List sessions matching a query
    #[command(after_help = "\
QUERY SYNTAX:
  term              Term must appear in the transcript
  term1 term2       Both terms (implicit AND)
  \"two words\"       Quoted text is free text
  year:2015         Session year
  session:101       Session ID
  track:media       Session track (case-insensitive)
  transcript:term   Term must appear in the transcript

EXAMPLES:
  scribe search swift
  scribe search 'year:2015 concurrency'
  scribe search 'track:\"developer tools\" debugging'")]
    Search(SearchCommand),

    /// Show the lines of one session that contain query terms
    Lines(LinesCommand),

    /// Show configuration files and index status
    Status,

    /// Show effective configuration settings
    Config,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["scribe", "search", "swift", "--index", "/tmp/x", "-vv"])
            .unwrap();
        assert_eq!(cli.index, Some(PathBuf::from("/tmp/x")));
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Search(_)));
    }

    #[test]
    fn lines_takes_key_and_query() {
        let cli = Cli::try_parse_from(["scribe", "lines", "2015-101", "swift", "--json"]).unwrap();
        let Commands::Lines(cmd) = cli.command else {
            panic!("expected lines command");
        };
        assert_eq!(cmd.session, "2015-101");
        assert_eq!(cmd.query, "swift");
        assert!(cmd.output.json);
    }
}
