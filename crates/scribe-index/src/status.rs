//! Index status detection.

use crate::{IndexStore, PersistenceError};

/// State of the persisted index relative to the current settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStatus {
    /// A snapshot exists and loads with the current settings.
    Current,
    /// A snapshot exists but was built with different settings or format.
    Stale,
    /// A snapshot file exists but cannot be read.
    Corrupt,
    /// No snapshot exists.
    Missing,
}

impl IndexStatus {
    /// Returns a human-readable description for display.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Stale => "stale (settings or format changed)",
            Self::Corrupt => "corrupt",
            Self::Missing => "missing",
        }
    }

    /// Returns true if a full rebuild is required before searching.
    pub fn needs_rebuild(&self) -> bool {
        !matches!(self, Self::Current)
    }
}

/// Classifies a load failure.
impl From<&PersistenceError> for IndexStatus {
    fn from(err: &PersistenceError) -> Self {
        match err {
            PersistenceError::Missing { .. } => Self::Missing,
            PersistenceError::Stale { .. } | PersistenceError::UnsupportedVersion { .. } => {
                Self::Stale
            }
            PersistenceError::Io { .. }
            | PersistenceError::Encode(_)
            | PersistenceError::Decode(_)
            | PersistenceError::Inconsistent(_) => Self::Corrupt,
        }
    }
}

/// Determines the status of the snapshot held by `store`.
pub fn detect_index_status(store: &IndexStore) -> IndexStatus {
    match store.load() {
        Ok(_) => IndexStatus::Current,
        Err(err) => IndexStatus::from(&err),
    }
}
