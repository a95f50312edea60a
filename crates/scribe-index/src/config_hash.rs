//! Configuration hash for snapshot versioning.
//!
//! The hash covers every setting that changes what ends up in the index. A snapshot
//! whose stored hash differs from the current one is stale and must be rebuilt.

use std::hash::Hasher;

use scribe_config::Config;
use siphasher::sip::SipHasher24;

use crate::Tokenizer;

/// Bumped whenever the indexed representation changes.
pub const SCHEMA_VERSION: u32 = 1;

/// Settings that affect index contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexingConfig {
    /// Index representation version.
    pub schema_version: u32,
    /// Effective minimum token length.
    pub min_token_len: u64,
}

impl IndexingConfig {
    /// Settings for a given tokenizer.
    pub fn for_tokenizer(tokenizer: Tokenizer) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            min_token_len: u64::try_from(tokenizer.min_len()).unwrap_or(u64::MAX),
        }
    }

    /// Extracts indexing-relevant settings from a config.
    pub fn from_config(config: &Config) -> Self {
        Self::for_tokenizer(Tokenizer::new(config.index.min_token_len))
    }

    /// Hash of these settings as 16 hex digits.
    ///
    /// Fields are fed as fixed-width little-endian bytes so the value is the same on
    /// every target.
    pub fn hash_string(&self) -> String {
        let mut hasher = SipHasher24::new();
        hasher.write(&self.schema_version.to_le_bytes());
        hasher.write(&self.min_token_len.to_le_bytes());
        format!("{:016x}", hasher.finish())
    }
}

/// Computes the config hash for a loaded configuration.
pub fn compute_config_hash(config: &Config) -> String {
    IndexingConfig::from_config(config).hash_string()
}
