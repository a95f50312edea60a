//! Transcript indexing and search for scribe.
//!
//! Session transcripts are tokenized into an [`InvertedIndex`] that answers
//! qualifier-filtered, conjunctive full-text queries per session. Built indexes are
//! wrapped in immutable [`IndexSnapshot`]s, persisted through an [`IndexStore`] and
//! produced off the caller's thread by a [`BackgroundIndexingService`].
//!
//! ```no_run
//! use scribe_index::{
//!     BackgroundIndexingService, IndexStore, SearchEngine, SessionKey, SessionTranscript,
//!     Tokenizer, TranscriptLine,
//! };
//!
//! let service = BackgroundIndexingService::new(IndexStore::new(".scribe", "v1"), Tokenizer::default())?;
//! let talk = SessionTranscript::new(2015, 101, vec![TranscriptLine::new("Hello Swift", 3.0)]);
//! service.run(vec![talk]).wait()?;
//!
//! let snapshot = service.snapshot().expect("built above");
//! let engine = SearchEngine::default();
//! assert!(engine.search(&snapshot, "year:2015 swift", SessionKey::new(2015, 101)));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

mod config_hash;
mod error;
mod index;
mod search;
mod service;
mod snapshot;
mod status;
mod store;
mod tokenizer;
mod transcript;

pub use config_hash::{IndexingConfig, SCHEMA_VERSION, compute_config_hash};
pub use error::{BuildFailure, IndexBuildError, PersistenceError};
pub use index::{BuildReport, InvertedIndex, LineMatch, Posting, PostingList, SessionAttributes};
pub use search::SearchEngine;
pub use service::{
    BackgroundIndexingService, BuildHandle, BuildKind, BuildOutcome, BuildSummary, ServiceState,
};
pub use snapshot::IndexSnapshot;
pub use status::{IndexStatus, detect_index_status};
pub use store::{FORMAT_VERSION, IndexStore, SNAPSHOT_FILE};
pub use tokenizer::{Tokenizer, Tokens};
pub use transcript::{
    ParseSessionKeyError, SessionKey, SessionTranscript, TranscriptLine, timecode_label,
};
