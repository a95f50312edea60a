//! Error types for the scribe-index crate.

use std::{io, path::PathBuf, sync::Arc};

use thiserror::Error;

use crate::SessionKey;

/// A transcript that could not be indexed.
///
/// These never abort a build; the entry is skipped and reported in the
/// [`BuildReport`](crate::BuildReport).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndexBuildError {
    /// A line has a negative or non-finite timecode.
    #[error("session {session}: line {line} has invalid timecode {timecode}")]
    InvalidTimecode {
        /// Offending session.
        session: SessionKey,
        /// Zero-based line position.
        line: usize,
        /// The rejected value.
        timecode: f64,
    },

    /// The same session appeared more than once in a batch; the last copy was kept.
    #[error("session {session} supplied more than once; using the last copy")]
    DuplicateSession {
        /// Duplicated session.
        session: SessionKey,
    },
}

/// Errors reading or writing a persisted index snapshot.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Filesystem access failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },

    /// The snapshot could not be encoded.
    #[error("failed to encode index: {0}")]
    Encode(#[source] serde_json::Error),

    /// The stored bytes are not a valid snapshot.
    #[error("failed to decode index: {0}")]
    Decode(#[source] serde_json::Error),

    /// The snapshot decoded but its contents contradict each other.
    #[error("inconsistent index: {0}")]
    Inconsistent(String),

    /// The snapshot was written by an incompatible format version.
    #[error("unsupported index format version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version recorded in the file.
        found: u32,
        /// Version this build reads.
        expected: u32,
    },

    /// The snapshot was built with different indexing settings.
    #[error("index is stale: built with config {stored}, current config is {expected}")]
    Stale {
        /// Config hash stored with the snapshot.
        stored: String,
        /// Hash of the current settings.
        expected: String,
    },

    /// No snapshot has been written.
    #[error("no index at {path}")]
    Missing {
        /// Expected snapshot location.
        path: PathBuf,
    },
}

impl PersistenceError {
    /// Wraps an I/O error with the path it concerns.
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Why a background build produced no new snapshot.
#[derive(Debug, Clone, Error)]
pub enum BuildFailure {
    /// The new snapshot could not be saved; the previous one remains current.
    #[error("failed to persist index: {0}")]
    Persistence(#[source] Arc<PersistenceError>),

    /// The build panicked; the worker survived and the previous snapshot remains.
    #[error("index build panicked: {0}")]
    Panicked(String),

    /// The service shut down before the request was processed.
    #[error("indexing service shut down before the build ran")]
    Cancelled,
}

impl From<PersistenceError> for BuildFailure {
    fn from(err: PersistenceError) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
