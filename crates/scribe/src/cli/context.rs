//! Shared context for running CLI commands.

use std::{
    env,
    path::{Path, PathBuf},
    process::ExitCode,
};

use scribe_config::Config;
use scribe_index::{
    BackgroundIndexingService, IndexSnapshot, IndexStore, PersistenceError, SearchEngine,
    Tokenizer,
};

/// Command execution context built once per CLI invocation.
pub struct CommandContext {
    /// Current working directory.
    pub cwd: PathBuf,
    /// Loaded configuration (may be default if no config files found).
    pub config: Config,
    /// Index directory given on the command line.
    index_override: Option<PathBuf>,
}

impl CommandContext {
    /// Loads the current directory and configuration.
    pub fn load(index_override: Option<PathBuf>) -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        let config = load_config_or_failure(&cwd)?;
        Ok(Self {
            cwd,
            config,
            index_override,
        })
    }

    /// Resolved index directory.
    pub fn index_dir(&self) -> PathBuf {
        match &self.index_override {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => self.cwd.join(dir),
            None => self.config.index_dir(&self.cwd),
        }
    }

    /// Snapshot store for the resolved index directory and current settings.
    pub fn store(&self) -> IndexStore {
        IndexStore::for_config(&self.config, self.index_dir())
    }

    /// Tokenizer configured for indexing.
    pub fn tokenizer(&self) -> Tokenizer {
        Tokenizer::new(self.config.index.min_token_len)
    }

    /// Search engine recognizing the configured qualifiers.
    pub fn engine(&self) -> SearchEngine {
        SearchEngine::from_config(&self.config)
    }

    /// Starts a background indexing service over the store.
    pub fn service(&self) -> Result<BackgroundIndexingService, ExitCode> {
        BackgroundIndexingService::new(self.store(), self.tokenizer()).map_err(|e| {
            eprintln!("error: failed to start indexing worker: {e}");
            ExitCode::FAILURE
        })
    }

    /// Loads the persisted snapshot, exiting with a consistent error when unusable.
    pub fn snapshot(&self) -> Result<IndexSnapshot, ExitCode> {
        match self.store().load() {
            Ok(snapshot) => Ok(snapshot),
            Err(PersistenceError::Missing { path }) => {
                eprintln!("error: no index at {}", path.display());
                eprintln!("Run 'scribe index <transcripts.json>' to build one.");
                Err(ExitCode::FAILURE)
            }
            Err(e @ PersistenceError::Stale { .. }) => {
                eprintln!("error: {e}");
                eprintln!("Settings changed since the last build; run 'scribe index' again.");
                Err(ExitCode::FAILURE)
            }
            Err(e) => {
                eprintln!("error: failed to open index: {e}");
                Err(ExitCode::FAILURE)
            }
        }
    }
}

/// Returns the current working directory or exits with a consistent error.
fn current_dir_or_failure() -> Result<PathBuf, ExitCode> {
    env::current_dir().map_err(|e| {
        eprintln!("error: could not determine current directory: {e}");
        ExitCode::FAILURE
    })
}

/// Loads configuration from the provided directory or exits with an error.
fn load_config_or_failure(cwd: &Path) -> Result<Config, ExitCode> {
    Config::load(cwd).map_err(|e| {
        eprintln!("error: failed to load configuration: {e}");
        ExitCode::FAILURE
    })
}
