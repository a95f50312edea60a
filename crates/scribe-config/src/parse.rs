//! Configuration file parsing.
//!
//! Each `.scribe.toml` is read into a [`RawConfig`] whose fields are all optional, so
//! that partial files can be layered during merging.

use std::{fs, path::Path};

use serde::Deserialize;
use serde_with::{OneOrMany, serde_as};

use crate::ConfigError;

/// Raw configuration as written in a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// When true, discovery stops here and neither parent nor global files apply.
    pub root: Option<bool>,
    /// `[index]` section.
    pub index: Option<RawIndexSettings>,
    /// `[search]` section.
    pub search: Option<RawSearchSettings>,
}

/// Raw `[index]` settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawIndexSettings {
    /// Index directory, relative to the config file's directory.
    pub dir: Option<String>,
    /// Shortest token kept by the tokenizer.
    pub min_token_len: Option<usize>,
}

/// Raw `[search]` settings.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSearchSettings {
    /// Recognized qualifier names; a single string or a list.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub qualifiers: Option<Vec<String>>,
}

/// Parses a configuration file from disk.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Checks if a config file has `root = true` set.
///
/// Unreadable or malformed files are not roots.
pub fn is_root_config(path: &Path) -> bool {
    fs::read_to_string(path)
        .ok()
        .and_then(|contents| toml::from_str::<RawConfig>(&contents).ok())
        .and_then(|config| config.root)
        .unwrap_or(false)
}
