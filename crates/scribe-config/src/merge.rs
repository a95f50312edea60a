//! Configuration merging.
//!
//! Layers parsed config files into a single [`Config`]. Files are supplied highest
//! precedence first; each setting takes the value from the closest file that defines it.

use std::path::PathBuf;

use crate::{
    Config, IndexSettings, SearchSettings,
    parse::{RawConfig, RawIndexSettings, RawSearchSettings},
};

/// A parsed config file with its source path.
#[derive(Debug, Clone)]
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

/// Merges configuration files into a resolved [`Config`].
///
/// The directory of the first (most specific) file becomes the config root.
pub fn merge_configs(configs: &[ParsedConfig]) -> Config {
    let mut index = IndexSettings::default();
    let mut search = SearchSettings::default();

    // Lowest precedence first so closer files overwrite
    for parsed in configs.iter().rev() {
        if let Some(raw) = &parsed.config.index {
            apply_index(&mut index, raw);
        }
        if let Some(raw) = &parsed.config.search {
            apply_search(&mut search, raw);
        }
    }

    let config_root = configs
        .first()
        .and_then(|c| c.path.parent())
        .map(|dir| dir.to_path_buf());

    Config {
        index,
        search,
        config_root,
    }
}

/// Overwrites index settings present in `raw`.
fn apply_index(result: &mut IndexSettings, raw: &RawIndexSettings) {
    if let Some(dir) = &raw.dir {
        result.dir = dir.clone();
    }
    if let Some(len) = raw.min_token_len {
        result.min_token_len = len;
    }
}

/// Overwrites search settings present in `raw`.
fn apply_search(result: &mut SearchSettings, raw: &RawSearchSettings) {
    if let Some(qualifiers) = &raw.qualifiers {
        result.qualifiers = qualifiers.clone();
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::{DEFAULT_QUALIFIERS, parse::parse_config_str};

    fn parsed(path: &str, toml: &str) -> ParsedConfig {
        ParsedConfig {
            path: PathBuf::from(path),
            config: parse_config_str(toml, Path::new(path)).unwrap(),
        }
    }

    #[test]
    fn empty_list_gives_defaults() {
        let config = merge_configs(&[]);
        assert_eq!(config.index.dir, ".scribe");
        assert_eq!(config.index.min_token_len, 1);
        assert_eq!(config.search.qualifiers, DEFAULT_QUALIFIERS);
        assert!(config.config_root.is_none());
    }

    #[test]
    fn closest_file_wins_per_field() {
        let config = merge_configs(&[
            parsed("/work/talks/.scribe.toml", "[index]\nmin_token_len = 3\n"),
            parsed(
                "/home/u/.scribe.toml",
                "[index]\ndir = \"shared\"\nmin_token_len = 2\n",
            ),
        ]);
        assert_eq!(config.index.min_token_len, 3);
        assert_eq!(config.index.dir, "shared");
    }

    #[test]
    fn qualifier_list_replaces_rather_than_appends() {
        let config = merge_configs(&[
            parsed("/a/.scribe.toml", "[search]\nqualifiers = \"year\"\n"),
            parsed("/.scribe.toml", "[search]\nqualifiers = [\"session\", \"track\"]\n"),
        ]);
        assert_eq!(config.search.qualifiers, vec!["year"]);
    }

    #[test]
    fn config_root_is_most_specific_directory() {
        let config = merge_configs(&[
            parsed("/work/talks/.scribe.toml", ""),
            parsed("/work/.scribe.toml", ""),
        ]);
        assert_eq!(config.config_root, Some(PathBuf::from("/work/talks")));
    }
}
