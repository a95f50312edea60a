//! Immutable index snapshots.

use std::time::SystemTime;

use crate::InvertedIndex;

/// A fully built index plus build metadata.
///
/// Snapshots are never modified after construction; a rebuild produces a new one.
#[derive(Debug, Clone)]
pub struct IndexSnapshot {
    /// The index.
    index: InvertedIndex,
    /// When the build finished.
    built_at: SystemTime,
    /// Hash of the indexing settings used.
    config_hash: String,
}

impl IndexSnapshot {
    /// Wraps a freshly built index, stamping it with the current time.
    pub fn new(index: InvertedIndex, config_hash: impl Into<String>) -> Self {
        Self::with_timestamp(index, config_hash, SystemTime::now())
    }

    /// Wraps an index with an explicit build time.
    pub fn with_timestamp(
        index: InvertedIndex,
        config_hash: impl Into<String>,
        built_at: SystemTime,
    ) -> Self {
        Self {
            index,
            built_at,
            config_hash: config_hash.into(),
        }
    }

    /// The index.
    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    /// Consumes the snapshot, returning its index.
    pub fn into_index(self) -> InvertedIndex {
        self.index
    }

    /// Build completion time.
    pub fn built_at(&self) -> SystemTime {
        self.built_at
    }

    /// Number of indexed sessions.
    pub fn session_count(&self) -> usize {
        self.index.session_count()
    }

    /// Config hash recorded at build time.
    pub fn config_hash(&self) -> &str {
        &self.config_hash
    }
}
