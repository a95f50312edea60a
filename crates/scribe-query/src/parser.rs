//! Query parser.
//!
//! Folds a token stream into a [`ParsedQuery`].
//!
//! # Grammar
//!
//! ```text
//! query     → item*
//! item      → QUALIFIER | WORD | PHRASE
//! QUALIFIER → NAME ":" (VALUE | '"' TEXT '"')
//! ```
//!
//! A qualifier whose name is in the recognized set goes into the qualifier map,
//! later occurrences replacing earlier ones. Everything else, including qualifiers
//! with unrecognized names, is free text and keeps its original order.

use std::collections::BTreeSet;

use crate::{
    error::ParseError,
    lexer::{Token, tokenize, tokenize_lenient},
    query::{FREE_TEXT_KEY, ParsedQuery, QualifierMap},
};

/// Parses raw search strings against a fixed set of qualifier names.
#[derive(Debug, Clone, Default)]
pub struct QueryParser {
    /// Recognized qualifier names, lowercased.
    qualifiers: BTreeSet<String>,
}

impl QueryParser {
    /// Creates a parser recognizing the given qualifier names (case-insensitive).
    ///
    /// The reserved free-text key is never recognized as a qualifier.
    pub fn new<I, S>(qualifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            qualifiers: qualifiers
                .into_iter()
                .map(|name| name.as_ref().to_lowercase())
                .filter(|name| !name.is_empty() && name != FREE_TEXT_KEY)
                .collect(),
        }
    }

    /// Returns true if `name` is a recognized qualifier.
    pub fn recognizes(&self, name: &str) -> bool {
        self.qualifiers.contains(&name.to_lowercase())
    }

    /// Recognized qualifier names in sorted order.
    pub fn qualifier_names(&self) -> impl Iterator<Item = &str> {
        self.qualifiers.iter().map(String::as_str)
    }

    /// Parses a raw query. Never fails.
    ///
    /// Malformed syntax is recovered by treating it as free text: an unclosed quote
    /// becomes a phrase running to the end of the input.
    pub fn parse(&self, input: &str) -> ParsedQuery {
        let tokens = tokenize(input).unwrap_or_else(|_| tokenize_lenient(input));
        self.fold(tokens)
    }

    /// Parses a raw query, reporting malformed syntax instead of recovering.
    pub fn try_parse(&self, input: &str) -> Result<ParsedQuery, ParseError> {
        Ok(self.fold(tokenize(input)?))
    }

    /// Splits tokens into qualifiers and free text.
    fn fold(&self, tokens: Vec<Token>) -> ParsedQuery {
        let mut qualifiers = QualifierMap::new();
        let mut free_text: Vec<String> = Vec::new();

        for token in tokens {
            match token {
                Token::Qualifier { name, value, .. }
                    if self.recognizes(&name) && !value.trim().is_empty() =>
                {
                    qualifiers.insert(&name, value.trim());
                }
                Token::Qualifier { raw, .. } => free_text.push(raw),
                Token::Word(word) => free_text.push(word),
                Token::Phrase(text) => free_text.push(text),
            }
        }

        ParsedQuery::new(qualifiers, &free_text.join(" "))
    }
}

/// Parses a query string with the given recognized qualifier names.
pub fn parse(input: &str, qualifiers: &[&str]) -> ParsedQuery {
    QueryParser::new(qualifiers).parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMES: &[&str] = &["year", "session", "transcript"];

    fn parser() -> QueryParser {
        QueryParser::new(NAMES)
    }

    #[test]
    fn empty_query() {
        let query = parser().parse("");
        assert!(query.is_empty());
        let query = parser().parse("   \t ");
        assert!(query.qualifiers().is_empty());
        assert_eq!(query.free_text(), "");
    }

    #[test]
    fn free_text_only() {
        let query = parser().parse("swift   concurrency");
        assert!(query.qualifiers().is_empty());
        assert_eq!(query.free_text(), "swift concurrency");
    }

    #[test]
    fn qualifier_and_free_text() {
        let query = parser().parse("year:2015 concurrency");
        assert_eq!(query.qualifier("year"), Some("2015"));
        assert_eq!(query.free_text(), "concurrency");
    }

    #[test]
    fn free_text_keeps_original_order_around_qualifiers() {
        let query = parser().parse("swift year:2015 ui session:101 layout");
        assert_eq!(query.free_text(), "swift ui layout");
        assert_eq!(query.qualifiers().len(), 2);
    }

    #[test]
    fn qualifier_names_match_case_insensitively() {
        let query = parser().parse("YEAR:2015 Session:101");
        assert_eq!(query.qualifier("year"), Some("2015"));
        assert_eq!(query.qualifier("session"), Some("101"));
    }

    #[test]
    fn unrecognized_qualifier_is_free_text() {
        let query = parser().parse("track:media year:2015");
        assert_eq!(query.free_text(), "track:media");
        assert_eq!(query.qualifier("track"), None);
    }

    #[test]
    fn later_qualifier_wins() {
        let query = parser().parse("year:2015 year:2016");
        assert_eq!(query.qualifier("year"), Some("2016"));
        assert_eq!(query.qualifiers().len(), 1);
        assert_eq!(query.free_text(), "");
    }

    #[test]
    fn quoted_qualifier_value() {
        let query = parser().parse("transcript:\"swift  ui\" year:2019");
        assert_eq!(query.qualifier("transcript"), Some("swift  ui"));
        assert_eq!(query.qualifier("year"), Some("2019"));
    }

    #[test]
    fn empty_quoted_value_falls_back_to_free_text() {
        let query = parser().parse("year:\"\" swift");
        assert_eq!(query.qualifier("year"), None);
        assert_eq!(query.free_text(), "year:\"\" swift");
    }

    #[test]
    fn phrases_are_free_text() {
        let query = parser().parse("\"main   actor\" isolation");
        assert_eq!(query.free_text(), "main actor isolation");
    }

    #[test]
    fn unclosed_quote_recovers() {
        let query = parser().parse("year:2015 \"swift concurrency");
        assert_eq!(query.qualifier("year"), Some("2015"));
        assert_eq!(query.free_text(), "swift concurrency");
    }

    #[test]
    fn unclosed_qualifier_quote_falls_back_to_free_text() {
        let query = parser().parse("year:\"2015 swift");
        assert_eq!(query.qualifier("year"), None);
        assert!(query.qualifiers().is_empty());
        assert_eq!(query.free_text(), "year:\"2015 swift");

        let query = parser().parse("session:101 transcript:\"async let");
        assert_eq!(query.qualifier("session"), Some("101"));
        assert_eq!(query.qualifier("transcript"), None);
        assert_eq!(query.free_text(), "transcript:\"async let");
    }

    #[test]
    fn try_parse_reports_unclosed_quote() {
        let err = parser().try_parse("\"swift").unwrap_err();
        assert_eq!(err.position, 0);
    }

    #[test]
    fn reserved_key_is_never_a_qualifier() {
        let parser = QueryParser::new(["year", FREE_TEXT_KEY]);
        assert!(!parser.recognizes(FREE_TEXT_KEY));
        let query = parser.parse("_query:swift");
        assert_eq!(query.free_text(), "_query:swift");
        assert_eq!(query.get(FREE_TEXT_KEY), Some("_query:swift"));
    }

    #[test]
    fn consumed_qualifiers_do_not_leak_into_free_text() {
        let inputs = [
            "year:2015 swift",
            "swift year:2015 year:2015",
            "session:101 year:2015 transcript:\"async let\"",
            "YEAR:2015",
        ];
        for input in inputs {
            let query = parser().parse(input);
            for (name, value) in query.qualifiers().iter() {
                let token = format!("{name}:{value}");
                assert!(
                    !query.free_text().to_lowercase().contains(&token),
                    "{input:?} leaked {token:?}"
                );
            }
        }
    }

    #[test]
    fn parse_is_total_on_odd_input() {
        let inputs = [
            "\"",
            "::",
            "year:",
            "\"\"",
            ":\"",
            "year:\"",
            "a:b:c:\"d",
            "\u{0}\u{feff} ",
        ];
        for input in inputs {
            let _ = parser().parse(input);
        }
    }

    #[test]
    fn convenience_parse_function() {
        let query = parse("year:2015 swift", &["year"]);
        assert_eq!(query.qualifier("year"), Some("2015"));
        assert_eq!(query.free_text(), "swift");
    }

    #[test]
    fn parse_long_query() {
        let input = "swift year:2015 ".repeat(2_000);
        let query = parser().parse(&input);
        assert_eq!(query.qualifier("year"), Some("2015"));
        assert_eq!(query.free_text().split(' ').count(), 2_000);
    }
}
