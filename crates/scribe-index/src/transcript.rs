//! Transcript data model.
//!
//! Transcripts are supplied by the caller and only read during a build.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable identifier of a session transcript, derived from year and session ID.
///
/// The text form is `"{year}-{session_id}"`, e.g. `2015-101`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct SessionKey {
    /// Conference year.
    pub year: u32,
    /// Session number, unique within a year.
    pub session_id: u32,
}

impl SessionKey {
    /// Creates a key from its parts.
    pub fn new(year: u32, session_id: u32) -> Self {
        Self { year, session_id }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.year, self.session_id)
    }
}

/// Error returned when a string is not a valid session key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid session key '{0}': expected YEAR-SESSION, e.g. 2015-101")]
pub struct ParseSessionKeyError(String);

impl FromStr for SessionKey {
    type Err = ParseSessionKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseSessionKeyError(s.to_string());
        let (year, session) = s.trim().split_once('-').ok_or_else(invalid)?;
        Ok(Self {
            year: year.parse().map_err(|_| invalid())?,
            session_id: session.parse().map_err(|_| invalid())?,
        })
    }
}

impl From<SessionKey> for String {
    fn from(key: SessionKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for SessionKey {
    type Error = ParseSessionKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One line of a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptLine {
    /// Spoken text.
    pub text: String,
    /// Offset into the session video, in seconds.
    pub timecode: f64,
}

impl TranscriptLine {
    /// Creates a line.
    pub fn new(text: impl Into<String>, timecode: f64) -> Self {
        Self {
            text: text.into(),
            timecode,
        }
    }

    /// Whole-second label used to address this line.
    pub fn timecode_label(&self) -> String {
        timecode_label(self.timecode)
    }
}

/// Formats a timecode as a whole number of seconds.
///
/// Rounds half away from zero. Negative and non-finite values label as `"0"`.
pub fn timecode_label(timecode: f64) -> String {
    if !timecode.is_finite() || timecode < 0.0 {
        return "0".to_string();
    }
    format!("{}", timecode.round() as u64)
}

/// The full transcript of one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionTranscript {
    /// Conference year.
    pub year: u32,
    /// Session number within the year.
    pub session_id: u32,
    /// Conference track, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<String>,
    /// Lines in playback order.
    #[serde(default)]
    pub lines: Vec<TranscriptLine>,
}

impl SessionTranscript {
    /// Creates a transcript without a track.
    pub fn new(year: u32, session_id: u32, lines: Vec<TranscriptLine>) -> Self {
        Self {
            year,
            session_id,
            track: None,
            lines,
        }
    }

    /// Sets the track.
    pub fn with_track(mut self, track: impl Into<String>) -> Self {
        self.track = Some(track.into());
        self
    }

    /// The join key for this transcript.
    pub fn key(&self) -> SessionKey {
        SessionKey::new(self.year, self.session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_text_form() {
        let key = SessionKey::new(2015, 101);
        assert_eq!(key.to_string(), "2015-101");
        assert_eq!("2015-101".parse::<SessionKey>().unwrap(), key);
        assert_eq!(" 2015-101 ".parse::<SessionKey>().unwrap(), key);
    }

    #[test]
    fn invalid_keys() {
        for input in ["", "2015", "2015-", "-101", "2015-abc", "2015-101-2", "x-1"] {
            assert!(input.parse::<SessionKey>().is_err(), "{input:?}");
        }
    }

    #[test]
    fn keys_with_same_id_in_different_years_differ() {
        assert_ne!(SessionKey::new(2015, 101), SessionKey::new(2016, 101));
        assert!(SessionKey::new(2015, 999) < SessionKey::new(2016, 1));
    }

    #[test]
    fn key_serializes_as_string() {
        let json = serde_json::to_string(&SessionKey::new(2019, 415)).unwrap();
        assert_eq!(json, "\"2019-415\"");
        let back: SessionKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SessionKey::new(2019, 415));
        assert!(serde_json::from_str::<SessionKey>("\"nope\"").is_err());
    }

    #[test]
    fn timecode_labels() {
        assert_eq!(timecode_label(0.0), "0");
        assert_eq!(timecode_label(12.4), "12");
        assert_eq!(timecode_label(12.5), "13");
        assert_eq!(timecode_label(12.6), "13");
        assert_eq!(timecode_label(3599.99), "3600");
        assert_eq!(timecode_label(-1.0), "0");
        assert_eq!(timecode_label(f64::NAN), "0");
        assert_eq!(timecode_label(f64::INFINITY), "0");
    }

    #[test]
    fn labels_are_monotonic() {
        let mut previous = 0;
        for step in 0..2_000 {
            let label: u64 = timecode_label(f64::from(step) * 0.37).parse().unwrap();
            assert!(label >= previous);
            previous = label;
        }
    }

    #[test]
    fn transcript_json_shape() {
        let json = r#"{"year": 2015, "session_id": 101, "lines": [{"text": "Hi", "timecode": 1.5}]}"#;
        let transcript: SessionTranscript = serde_json::from_str(json).unwrap();
        assert_eq!(transcript.key(), SessionKey::new(2015, 101));
        assert!(transcript.track.is_none());
        assert_eq!(transcript.lines[0].timecode_label(), "2");

        let empty: SessionTranscript =
            serde_json::from_str(r#"{"year": 2016, "session_id": 7}"#).unwrap();
        assert!(empty.lines.is_empty());
    }
}
