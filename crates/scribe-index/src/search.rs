//! Query evaluation against a snapshot.

use scribe_config::Config;
use scribe_query::{ParsedQuery, QueryParser};

use crate::{IndexSnapshot, LineMatch, SessionKey};

/// Answers raw queries against an [`IndexSnapshot`].
///
/// The engine holds only the qualifier vocabulary; every call names the snapshot it
/// reads, so concurrent callers can use different snapshots.
#[derive(Debug, Clone)]
pub struct SearchEngine {
    /// Parser for raw query strings.
    parser: QueryParser,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl SearchEngine {
    /// Creates an engine using `parser` to interpret queries.
    pub fn new(parser: QueryParser) -> Self {
        Self { parser }
    }

    /// Creates an engine recognizing the configured qualifiers.
    pub fn from_config(config: &Config) -> Self {
        Self::new(QueryParser::new(&config.search.qualifiers))
    }

    /// The query parser.
    pub fn parser(&self) -> &QueryParser {
        &self.parser
    }

    /// Parses a raw query.
    pub fn parse(&self, raw: &str) -> ParsedQuery {
        self.parser.parse(raw)
    }

    /// Returns true if session `key` matches `raw`.
    pub fn search(&self, snapshot: &IndexSnapshot, raw: &str, key: SessionKey) -> bool {
        snapshot.index().matches(key, &self.parse(raw))
    }

    /// All sessions matching `raw`, in key order.
    pub fn matching_sessions(&self, snapshot: &IndexSnapshot, raw: &str) -> Vec<SessionKey> {
        let query = self.parse(raw);
        let index = snapshot.index();
        index
            .session_keys()
            .filter(|key| index.matches(*key, &query))
            .collect()
    }

    /// Lines of session `key` that contain a searched term, in playback order.
    pub fn matching_lines(
        &self,
        snapshot: &IndexSnapshot,
        raw: &str,
        key: SessionKey,
    ) -> Vec<LineMatch> {
        snapshot.index().matching_lines(key, &self.parse(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InvertedIndex, SessionTranscript, TranscriptLine};

    fn snapshot() -> IndexSnapshot {
        let mut index = InvertedIndex::default();
        index.build(&[
            SessionTranscript::new(
                2015,
                101,
                vec![
                    TranscriptLine::new("Swift is great", 0.0),
                    TranscriptLine::new("Concurrency matters", 12.7),
                ],
            ),
            SessionTranscript::new(
                2016,
                101,
                vec![TranscriptLine::new("Concurrency again", 3.2)],
            ),
        ]);
        IndexSnapshot::new(index, "test")
    }

    #[test]
    fn search_single_session() {
        let engine = SearchEngine::default();
        let snapshot = snapshot();
        assert!(engine.search(&snapshot, "year:2015 concurrency", SessionKey::new(2015, 101)));
        assert!(!engine.search(&snapshot, "year:2015 concurrency", SessionKey::new(2016, 101)));
    }

    #[test]
    fn sessions_in_key_order() {
        let engine = SearchEngine::default();
        assert_eq!(
            engine.matching_sessions(&snapshot(), "concurrency"),
            vec![SessionKey::new(2015, 101), SessionKey::new(2016, 101)]
        );
    }

    #[test]
    fn qualifier_outside_vocabulary_is_free_text() {
        let engine = SearchEngine::new(QueryParser::new(["session"]));
        // `year:2015` is not recognized, so it becomes the terms "year" and "2015"
        assert!(engine.matching_sessions(&snapshot(), "year:2015").is_empty());
    }

    #[test]
    fn lines_with_labels() {
        let engine = SearchEngine::default();
        let lines = engine.matching_lines(&snapshot(), "concurrency", SessionKey::new(2015, 101));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].label, "13");
        assert_eq!(lines[0].text, "Concurrency matters");
    }
}
