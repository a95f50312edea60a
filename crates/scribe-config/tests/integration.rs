//! Integration tests for scribe-config.
//!
//! Exercises the full loading pipeline: discovery, parsing, merging.

// Integration tests live outside cfg(test)
#![allow(clippy::tests_outside_test_module)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use scribe_config::{CONFIG_FILENAME, Config, ConfigError, ConfigWarning, DEFAULT_QUALIFIERS};

/// Temporary directory tree for a test.
struct TestEnv {
    root: tempfile::TempDir,
}

impl TestEnv {
    fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.root.path()
    }

    fn create_dir(&self, rel_path: &str) -> PathBuf {
        let path = self.root.path().join(rel_path);
        fs::create_dir_all(&path).unwrap();
        path
    }

    fn create_config(&self, rel_dir: &str, content: &str) -> PathBuf {
        let dir = self.create_dir(rel_dir);
        let path = dir.join(CONFIG_FILENAME);
        fs::write(&path, content).unwrap();
        path
    }
}

#[test]
fn root_config_alone_sets_everything() {
    let env = TestEnv::new();
    env.create_config(
        "project",
        r#"
root = true

[index]
dir = "cache"
min_token_len = 2

[search]
qualifiers = ["year", "session"]
"#,
    );
    let cwd = env.create_dir("project/wwdc/2015");

    let config = Config::load(&cwd).unwrap();
    assert_eq!(config.index.dir, "cache");
    assert_eq!(config.index.min_token_len, 2);
    assert_eq!(config.search.qualifiers, vec!["year", "session"]);
    assert_eq!(config.config_root, Some(env.path().join("project")));
    assert_eq!(config.index_dir(&cwd), env.path().join("project/cache"));
}

#[test]
fn nested_configs_layer_under_root() {
    let env = TestEnv::new();
    env.create_config(
        "project",
        "root = true\n[index]\ndir = \"idx\"\nmin_token_len = 3\n",
    );
    env.create_config("project/talks", "[index]\nmin_token_len = 2\n");
    let cwd = env.create_dir("project/talks/notes");

    let config = Config::load(&cwd).unwrap();
    assert_eq!(config.index.min_token_len, 2);
    assert_eq!(config.index.dir, "idx");
    assert_eq!(config.search.qualifiers, DEFAULT_QUALIFIERS);
    assert_eq!(config.config_root, Some(env.path().join("project/talks")));
}

#[test]
fn load_from_explicit_files() {
    let env = TestEnv::new();
    let high = env.create_config("a", "[search]\nqualifiers = \"year\"\n");
    let low = env.create_config("b", "[index]\nmin_token_len = 4\n");

    let config = Config::load_from_files(&[high, low]).unwrap();
    assert_eq!(config.search.qualifiers, vec!["year"]);
    assert_eq!(config.index.min_token_len, 4);
}

#[test]
fn empty_file_list_is_default() {
    let config = Config::load_from_files(&[]).unwrap();
    assert_eq!(config.index.dir, ".scribe");
    assert!(config.config_root.is_none());
}

#[test]
fn malformed_config_is_an_error() {
    let env = TestEnv::new();
    env.create_config("project", "root = true\n[index\n");
    let cwd = env.create_dir("project");

    let err = Config::load(&cwd).unwrap_err();
    assert!(matches!(err, ConfigError::ParseToml { .. }));
    assert!(err.to_string().contains(CONFIG_FILENAME));
}

#[test]
fn missing_explicit_file_is_an_error() {
    let env = TestEnv::new();
    let err = Config::load_from_files(&[env.path().join("nope.toml")]).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
}

#[test]
fn loaded_config_validates() {
    let env = TestEnv::new();
    env.create_config(
        "project",
        "root = true\n[index]\nmin_token_len = 0\n[search]\nqualifiers = [\"year\", \"speaker\"]\n",
    );
    let config = Config::load(&env.path().join("project")).unwrap();

    let warnings = config.validate();
    assert!(warnings.contains(&ConfigWarning::ZeroMinTokenLen));
    assert!(warnings.contains(&ConfigWarning::UnsupportedQualifier {
        name: "speaker".into()
    }));
    assert_eq!(warnings.len(), 2);
}

#[test]
fn rendered_settings_reload_identically() {
    let env = TestEnv::new();
    env.create_config(
        "project",
        "root = true\n[index]\nmin_token_len = 2\n[search]\nqualifiers = \"session\"\n",
    );
    let config = Config::load(&env.path().join("project")).unwrap();

    let rendered = config.settings_to_toml().unwrap();
    let copy = env.create_config("copy", &format!("root = true\n{rendered}"));
    let reloaded = Config::load_from_files(&[copy]).unwrap();

    assert_eq!(reloaded.index, config.index);
    assert_eq!(reloaded.search, config.search);
}
