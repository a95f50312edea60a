//! On-disk snapshot storage.
//!
//! A snapshot is a single JSON file inside the index directory. Saves go to a
//! temporary file that is synced and then renamed over the previous snapshot, so a
//! crash mid-write leaves the last good file in place.

use std::{
    fs::{self, File},
    io::{self, ErrorKind, Write},
    path::{Path, PathBuf},
    time::SystemTime,
};

use scribe_config::Config;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    IndexSnapshot, InvertedIndex, PersistenceError, config_hash::compute_config_hash,
    index::PersistedIndex,
};

/// Snapshot file name inside the index directory.
pub const SNAPSHOT_FILE: &str = "snapshot.json";

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

/// Durable store for one index snapshot.
#[derive(Debug, Clone)]
pub struct IndexStore {
    /// Index directory.
    dir: PathBuf,
    /// Hash a loadable snapshot must carry.
    config_hash: String,
}

impl IndexStore {
    /// Creates a store in `dir` that accepts snapshots built with `config_hash`.
    pub fn new(dir: impl Into<PathBuf>, config_hash: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            config_hash: config_hash.into(),
        }
    }

    /// Creates a store in `dir` for the indexing settings of `config`.
    pub fn for_config(config: &Config, dir: impl Into<PathBuf>) -> Self {
        Self::new(dir, compute_config_hash(config))
    }

    /// The index directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_FILE)
    }

    /// The config hash this store expects.
    pub fn config_hash(&self) -> &str {
        &self.config_hash
    }

    /// Returns true if a snapshot file exists. Says nothing about whether it loads.
    pub fn exists(&self) -> bool {
        self.path().is_file()
    }

    /// Loads the persisted snapshot.
    ///
    /// Either the whole snapshot loads or an error is returned.
    pub fn load(&self) -> Result<IndexSnapshot, PersistenceError> {
        let path = self.path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(PersistenceError::Missing { path });
            }
            Err(err) => return Err(PersistenceError::io(path, err)),
        };

        let file: SnapshotFile =
            serde_json::from_slice(&bytes).map_err(PersistenceError::Decode)?;
        if file.format_version != FORMAT_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                found: file.format_version,
                expected: FORMAT_VERSION,
            });
        }
        if file.config_hash != self.config_hash {
            return Err(PersistenceError::Stale {
                stored: file.config_hash,
                expected: self.config_hash.clone(),
            });
        }

        let index = InvertedIndex::from_persisted(file.index)?;
        if index.session_count() != file.session_count {
            return Err(PersistenceError::Inconsistent(format!(
                "header lists {} sessions, index holds {}",
                file.session_count,
                index.session_count()
            )));
        }

        debug!(
            path = %path.display(),
            sessions = index.session_count(),
            "loaded index snapshot"
        );
        Ok(IndexSnapshot::with_timestamp(
            index,
            file.config_hash,
            file.built_at,
        ))
    }

    /// Atomically writes `snapshot`, replacing any previous one.
    pub fn save(&self, snapshot: &IndexSnapshot) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir).map_err(|e| PersistenceError::io(&self.dir, e))?;

        let file = SnapshotFile {
            format_version: FORMAT_VERSION,
            config_hash: snapshot.config_hash().to_string(),
            built_at: snapshot.built_at(),
            session_count: snapshot.session_count(),
            index: snapshot.index().to_persisted(),
        };
        let bytes = serde_json::to_vec(&file).map_err(PersistenceError::Encode)?;

        let path = self.path();
        let tmp_path = path.with_extension("json.tmp");
        let written = write_synced(&tmp_path, &bytes)
            .map_err(|e| PersistenceError::io(&tmp_path, e))
            .and_then(|()| fs::rename(&tmp_path, &path).map_err(|e| PersistenceError::io(&path, e)));
        if let Err(err) = written {
            // The previous snapshot is untouched; only the partial temp file goes
            if let Err(cleanup) = fs::remove_file(&tmp_path)
                && cleanup.kind() != ErrorKind::NotFound
            {
                debug!(path = %tmp_path.display(), error = %cleanup, "could not remove temp snapshot");
            }
            return Err(err);
        }

        debug!(
            path = %path.display(),
            bytes = bytes.len(),
            sessions = file.session_count,
            "saved index snapshot"
        );
        Ok(())
    }
}

/// Writes `bytes` to `path` and flushes them to disk.
fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// Snapshot file layout.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    /// On-disk format version.
    format_version: u32,
    /// Indexing settings hash.
    config_hash: String,
    /// Build completion time.
    #[serde(with = "system_time_serde")]
    built_at: SystemTime,
    /// Number of sessions, checked on load.
    session_count: usize,
    /// The index itself.
    index: PersistedIndex,
}

/// Serde helpers for `SystemTime` as Unix seconds.
mod system_time_serde {
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serializes a `SystemTime` as seconds since the Unix epoch.
    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        time.duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs()
            .serialize(serializer)
    }

    /// Deserializes seconds since the Unix epoch.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(UNIX_EPOCH + Duration::from_secs(u64::deserialize(deserializer)?))
    }
}
