//! Inverted index over session transcripts.
//!
//! Terms map to posting lists; each session additionally keeps its qualifier
//! attributes, the set of terms it contains and its ordered line table, so queries
//! are answered without the original transcripts.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use scribe_query::ParsedQuery;
use serde::{Deserialize, Serialize};

use crate::{
    IndexBuildError, PersistenceError, SessionKey, SessionTranscript, Tokenizer, TranscriptLine,
    timecode_label,
};

/// One occurrence of a term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    /// Session containing the occurrence.
    pub session: SessionKey,
    /// Zero-based line position within the session.
    pub line: u32,
    /// Timecode of that line, in seconds.
    pub timecode: f64,
}

/// Postings for one term, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostingList {
    /// Entries in the order they were indexed.
    entries: Vec<Posting>,
}

impl PostingList {
    /// The postings.
    pub fn entries(&self) -> &[Posting] {
        &self.entries
    }

    /// Number of postings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the list holds no postings.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends a posting.
    fn push(&mut self, posting: Posting) {
        self.entries.push(posting);
    }

    /// Drops every posting of `session`.
    fn remove_session(&mut self, session: SessionKey) {
        self.entries.retain(|p| p.session != session);
    }
}

/// Qualifier-facing attributes of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionAttributes {
    /// Conference year.
    pub year: u32,
    /// Session number within the year.
    pub session_id: u32,
    /// Conference track, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<String>,
}

/// Everything the index retains about one session.
#[derive(Debug, Clone, PartialEq)]
struct SessionEntry {
    /// Qualifier attributes.
    attributes: SessionAttributes,
    /// Distinct terms occurring anywhere in the session.
    terms: HashSet<String>,
    /// Ordered line table.
    lines: Vec<TranscriptLine>,
}

/// A line that contains at least one searched term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineMatch {
    /// Zero-based line position.
    pub line: u32,
    /// Line timecode in seconds.
    pub timecode: f64,
    /// Whole-second label of the timecode.
    pub label: String,
    /// Line text.
    pub text: String,
}

/// Outcome of a build or merge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    /// Sessions written to the index.
    pub indexed: usize,
    /// Entries that were skipped or overridden.
    pub skipped: Vec<IndexBuildError>,
}

impl BuildReport {
    /// Returns true if nothing was skipped.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Inverted index from terms to postings.
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    /// Tokenizer shared by indexing and query evaluation.
    tokenizer: Tokenizer,
    /// Term to postings.
    postings: HashMap<String, PostingList>,
    /// Per-session data, ordered by key.
    sessions: BTreeMap<SessionKey, SessionEntry>,
}

impl InvertedIndex {
    /// Creates an empty index.
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self {
            tokenizer,
            postings: HashMap::new(),
            sessions: BTreeMap::new(),
        }
    }

    /// The tokenizer this index was built with.
    pub fn tokenizer(&self) -> Tokenizer {
        self.tokenizer
    }

    /// Number of indexed sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of distinct terms.
    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    /// Returns true if the session is indexed.
    pub fn contains_session(&self, key: SessionKey) -> bool {
        self.sessions.contains_key(&key)
    }

    /// Indexed session keys in ascending order.
    pub fn session_keys(&self) -> impl Iterator<Item = SessionKey> + '_ {
        self.sessions.keys().copied()
    }

    /// Attributes of one session.
    pub fn attributes(&self, key: SessionKey) -> Option<&SessionAttributes> {
        self.sessions.get(&key).map(|entry| &entry.attributes)
    }

    /// The retained line table of one session.
    pub fn lines(&self, key: SessionKey) -> Option<&[TranscriptLine]> {
        self.sessions.get(&key).map(|entry| entry.lines.as_slice())
    }

    /// Postings for a term, after normalizing it with the index tokenizer.
    ///
    /// Returns `None` unless `term` normalizes to exactly one token.
    pub fn postings(&self, term: &str) -> Option<&PostingList> {
        let mut tokens = self.tokenizer.tokens(term);
        let token = tokens.next()?;
        if tokens.next().is_some() {
            return None;
        }
        self.postings.get(&token)
    }

    /// Replaces the whole index with `transcripts`.
    ///
    /// Invalid transcripts are skipped; for duplicate keys the last copy wins.
    pub fn build(&mut self, transcripts: &[SessionTranscript]) -> BuildReport {
        self.postings.clear();
        self.sessions.clear();
        self.merge(transcripts)
    }

    /// Re-indexes the sessions in `transcripts`, leaving all others untouched.
    ///
    /// A session that fails validation keeps whatever the index held for it before.
    pub fn merge(&mut self, transcripts: &[SessionTranscript]) -> BuildReport {
        let (accepted, mut skipped) = dedup_batch(transcripts);
        let mut indexed = 0;

        for transcript in accepted {
            if let Err(err) = validate(transcript) {
                skipped.push(err);
                continue;
            }
            self.remove_session(transcript.key());
            self.insert_session(transcript);
            indexed += 1;
        }

        BuildReport { indexed, skipped }
    }

    /// Removes one session and all of its postings.
    pub fn remove_session(&mut self, key: SessionKey) -> bool {
        let Some(entry) = self.sessions.remove(&key) else {
            return false;
        };
        for term in &entry.terms {
            if let Some(list) = self.postings.get_mut(term) {
                list.remove_session(key);
                if list.is_empty() {
                    self.postings.remove(term);
                }
            }
        }
        true
    }

    /// Tokenizes a validated transcript and records its postings.
    fn insert_session(&mut self, transcript: &SessionTranscript) {
        let key = transcript.key();
        let mut terms = HashSet::new();

        for (position, line) in (0u32..).zip(&transcript.lines) {
            for token in self.tokenizer.tokens(&line.text) {
                self.postings.entry(token.clone()).or_default().push(Posting {
                    session: key,
                    line: position,
                    timecode: line.timecode,
                });
                terms.insert(token);
            }
        }

        self.sessions.insert(
            key,
            SessionEntry {
                attributes: SessionAttributes {
                    year: transcript.year,
                    session_id: transcript.session_id,
                    track: transcript.track.clone(),
                },
                terms,
                lines: transcript.lines.clone(),
            },
        );
    }

    /// Returns true if the session satisfies every qualifier and contains every
    /// free-text term.
    ///
    /// An unknown session never matches. A qualifier with no evaluation rule never
    /// matches. Free text that tokenizes to nothing places no constraint.
    pub fn matches(&self, key: SessionKey, query: &ParsedQuery) -> bool {
        let Some(entry) = self.sessions.get(&key) else {
            return false;
        };

        query
            .qualifiers()
            .iter()
            .all(|(name, value)| self.qualifier_matches(entry, name, value))
            && self.contains_all_terms(entry, query.free_text())
    }

    /// Evaluates one qualifier against a session.
    fn qualifier_matches(&self, entry: &SessionEntry, name: &str, value: &str) -> bool {
        let attributes = &entry.attributes;
        match name {
            "year" => attributes.year.to_string() == value,
            "session" => attributes.session_id.to_string() == value,
            "track" => attributes
                .track
                .as_deref()
                .is_some_and(|track| track.eq_ignore_ascii_case(value)),
            "transcript" => self.contains_all_terms(entry, value),
            _ => false,
        }
    }

    /// Returns true if every term of `text` occurs in the session.
    fn contains_all_terms(&self, entry: &SessionEntry, text: &str) -> bool {
        self.tokenizer
            .tokens(text)
            .all(|term| entry.terms.contains(&term))
    }

    /// Lines of a matching session that contain any free-text or `transcript:` term.
    ///
    /// Lines are returned in playback order. Empty if the session does not match.
    pub fn matching_lines(&self, key: SessionKey, query: &ParsedQuery) -> Vec<LineMatch> {
        if !self.matches(key, query) {
            return Vec::new();
        }
        let Some(entry) = self.sessions.get(&key) else {
            return Vec::new();
        };

        let mut terms = self.tokenizer.terms(query.free_text());
        if let Some(value) = query.qualifier("transcript") {
            terms.extend(self.tokenizer.tokens(value));
        }

        let positions: BTreeSet<u32> = terms
            .iter()
            .filter_map(|term| self.postings.get(term))
            .flat_map(PostingList::entries)
            .filter(|posting| posting.session == key)
            .map(|posting| posting.line)
            .collect();

        positions
            .into_iter()
            .filter_map(|position| {
                let line = entry.lines.get(position as usize)?;
                Some(LineMatch {
                    line: position,
                    timecode: line.timecode,
                    label: timecode_label(line.timecode),
                    text: line.text.clone(),
                })
            })
            .collect()
    }

    /// Encodes the index as JSON.
    pub fn serialize(&self) -> Result<Vec<u8>, PersistenceError> {
        serde_json::to_vec(&self.to_persisted()).map_err(PersistenceError::Encode)
    }

    /// Decodes an index produced by [`serialize`](Self::serialize).
    pub fn deserialize(bytes: &[u8]) -> Result<Self, PersistenceError> {
        let persisted: PersistedIndex =
            serde_json::from_slice(bytes).map_err(PersistenceError::Decode)?;
        Self::from_persisted(persisted)
    }

    /// Converts to the durable form.
    pub(crate) fn to_persisted(&self) -> PersistedIndex {
        PersistedIndex {
            min_token_len: self.tokenizer.min_len(),
            sessions: self
                .sessions
                .values()
                .map(|entry| PersistedSession {
                    attributes: entry.attributes.clone(),
                    lines: entry.lines.clone(),
                })
                .collect(),
            postings: self
                .postings
                .iter()
                .map(|(term, list)| (term.clone(), list.clone()))
                .collect(),
        }
    }

    /// Rebuilds the in-memory form, checking that postings and sessions agree.
    pub(crate) fn from_persisted(persisted: PersistedIndex) -> Result<Self, PersistenceError> {
        let mut sessions = BTreeMap::new();
        for session in persisted.sessions {
            let key = SessionKey::new(session.attributes.year, session.attributes.session_id);
            let entry = SessionEntry {
                attributes: session.attributes,
                terms: HashSet::new(),
                lines: session.lines,
            };
            if sessions.insert(key, entry).is_some() {
                return Err(PersistenceError::Inconsistent(format!(
                    "session {key} stored twice"
                )));
            }
        }

        for (term, list) in &persisted.postings {
            for posting in list.entries() {
                let entry = sessions.get_mut(&posting.session).ok_or_else(|| {
                    PersistenceError::Inconsistent(format!(
                        "term '{term}' refers to unknown session {}",
                        posting.session
                    ))
                })?;
                if posting.line as usize >= entry.lines.len() {
                    return Err(PersistenceError::Inconsistent(format!(
                        "term '{term}' refers to line {} of session {}",
                        posting.line, posting.session
                    )));
                }
                entry.terms.insert(term.clone());
            }
        }

        Ok(Self {
            tokenizer: Tokenizer::new(persisted.min_token_len),
            postings: persisted.postings.into_iter().collect(),
            sessions,
        })
    }
}

/// Keeps the last copy of each session in a batch, preserving batch order.
fn dedup_batch(
    transcripts: &[SessionTranscript],
) -> (Vec<&SessionTranscript>, Vec<IndexBuildError>) {
    let last: HashMap<SessionKey, usize> = transcripts
        .iter()
        .enumerate()
        .map(|(i, t)| (t.key(), i))
        .collect();

    let mut accepted = Vec::with_capacity(last.len());
    let mut skipped = Vec::new();
    for (i, transcript) in transcripts.iter().enumerate() {
        let key = transcript.key();
        if last.get(&key) == Some(&i) {
            accepted.push(transcript);
        } else {
            skipped.push(IndexBuildError::DuplicateSession { session: key });
        }
    }
    (accepted, skipped)
}

/// Rejects transcripts with negative or non-finite timecodes.
fn validate(transcript: &SessionTranscript) -> Result<(), IndexBuildError> {
    match transcript
        .lines
        .iter()
        .position(|line| !line.timecode.is_finite() || line.timecode < 0.0)
    {
        Some(line) => Err(IndexBuildError::InvalidTimecode {
            session: transcript.key(),
            line,
            timecode: transcript.lines[line].timecode,
        }),
        None => Ok(()),
    }
}

/// Durable form of an [`InvertedIndex`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PersistedIndex {
    /// Tokenizer setting the postings were produced with.
    min_token_len: usize,
    /// Sessions in key order.
    sessions: Vec<PersistedSession>,
    /// Term to postings, sorted by term for stable output.
    postings: BTreeMap<String, PostingList>,
}

/// Durable form of one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedSession {
    /// Qualifier attributes.
    #[serde(flatten)]
    attributes: SessionAttributes,
    /// Ordered line table.
    lines: Vec<TranscriptLine>,
}
