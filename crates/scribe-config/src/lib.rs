//! Configuration system for scribe.
//!
//! scribe reads TOML files named `.scribe.toml`. They are collected by walking up from
//! the working directory, then `~/.scribe.toml` is added with the lowest precedence. A
//! file containing `root = true` stops the walk.
//!
//! ```toml
//! [index]
//! dir = ".scribe"
//! min_token_len = 1
//!
//! [search]
//! qualifiers = ["year", "session", "track", "transcript"]
//! ```

#![warn(missing_docs)]

mod discovery;
mod error;
mod merge;
mod parse;
mod validate;

use std::path::{Path, PathBuf};

pub use discovery::{CONFIG_FILENAME, discover_config_files, global_config_path, is_global_config};
pub use error::ConfigError;
pub use merge::{ParsedConfig, merge_configs};
pub use parse::{
    RawConfig, RawIndexSettings, RawSearchSettings, is_root_config, parse_config_file,
    parse_config_str,
};
use serde::{Deserialize, Serialize};
pub use validate::ConfigWarning;
use validate::validate_config;

/// Qualifier names the search engine knows how to evaluate.
pub const DEFAULT_QUALIFIERS: &[&str] = &["year", "session", "track", "transcript"];

/// Default index directory name.
pub const DEFAULT_INDEX_DIR: &str = ".scribe";

/// Fully merged configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Index settings.
    pub index: IndexSettings,
    /// Search settings.
    pub search: SearchSettings,
    /// Directory containing the most specific config file.
    pub config_root: Option<PathBuf>,
}

impl Config {
    /// Discovers and merges all configuration files relevant to `cwd`.
    ///
    /// Returns the default configuration when no files are found.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        Self::load_from_files(&discover_config_files(cwd))
    }

    /// Loads configuration from explicit files, highest precedence first.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        let parsed = files
            .iter()
            .map(|path| {
                Ok(ParsedConfig {
                    path: path.clone(),
                    config: parse_config_file(path)?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(merge_configs(&parsed))
    }

    /// Returns warnings for settings that will not behave as written.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        validate_config(self)
    }

    /// Resolves the index directory.
    ///
    /// Relative paths are taken from the config root, or from `cwd` when no config
    /// file was found.
    pub fn index_dir(&self, cwd: &Path) -> PathBuf {
        let dir = Path::new(&self.index.dir);
        if dir.is_absolute() {
            return dir.to_path_buf();
        }
        self.config_root.as_deref().unwrap_or(cwd).join(dir)
    }

    /// Renders the effective settings in `.scribe.toml` form.
    pub fn settings_to_toml(&self) -> Result<String, ConfigError> {
        let serializable = SerializableSettings {
            index: &self.index,
            search: &self.search,
        };
        Ok(toml::to_string_pretty(&serializable)?)
    }
}

/// Index storage and tokenization settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct IndexSettings {
    /// Index directory as configured.
    pub dir: String,
    /// Shortest token kept when indexing and searching.
    pub min_token_len: usize,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            dir: DEFAULT_INDEX_DIR.to_string(),
            min_token_len: 1,
        }
    }
}

/// Query settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Qualifier names the query parser recognizes.
    pub qualifiers: Vec<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            qualifiers: DEFAULT_QUALIFIERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Borrowed view used for TOML output.
#[derive(Serialize)]
struct SerializableSettings<'a> {
    /// `[index]` section.
    index: &'a IndexSettings,
    /// `[search]` section.
    search: &'a SearchSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.index.dir, ".scribe");
        assert_eq!(config.index.min_token_len, 1);
        assert_eq!(config.search.qualifiers, DEFAULT_QUALIFIERS);
        assert!(config.config_root.is_none());
    }

    #[test]
    fn index_dir_relative_to_config_root() {
        let mut config = Config::default();
        assert_eq!(
            config.index_dir(Path::new("/cwd")),
            PathBuf::from("/cwd/.scribe")
        );

        config.config_root = Some(PathBuf::from("/project"));
        assert_eq!(
            config.index_dir(Path::new("/cwd")),
            PathBuf::from("/project/.scribe")
        );

        config.index.dir = "/var/cache/scribe".into();
        assert_eq!(
            config.index_dir(Path::new("/cwd")),
            PathBuf::from("/var/cache/scribe")
        );
    }

    #[test]
    fn settings_to_toml_round_trips() {
        let toml = Config::default().settings_to_toml().unwrap();
        assert!(toml.contains("[index]"));
        assert!(toml.contains("[search]"));
        assert!(toml.contains("min_token_len = 1"));

        let raw = parse_config_str(&toml, Path::new("rendered.toml")).unwrap();
        assert_eq!(raw.index.unwrap().dir.as_deref(), Some(".scribe"));
        assert_eq!(
            raw.search.unwrap().qualifiers.unwrap(),
            DEFAULT_QUALIFIERS
        );
    }
}
