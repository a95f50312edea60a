//! Text tokenization for indexing and search.
//!
//! Text is split on every non-alphanumeric character and lowercased. The same
//! tokenizer is used when indexing lines and when evaluating query text, so both
//! sides agree on what a term is.

use std::collections::BTreeSet;

/// Splits text into normalized terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tokenizer {
    /// Shortest token kept, in characters. Always at least 1.
    min_len: usize,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Tokenizer {
    /// Creates a tokenizer dropping tokens shorter than `min_len` characters.
    ///
    /// A `min_len` of zero behaves like 1.
    pub fn new(min_len: usize) -> Self {
        Self {
            min_len: min_len.max(1),
        }
    }

    /// The effective minimum token length.
    pub fn min_len(&self) -> usize {
        self.min_len
    }

    /// Lazily tokenizes `text`.
    ///
    /// The returned iterator can be cloned to restart from the same position.
    pub fn tokens<'a>(&self, text: &'a str) -> Tokens<'a> {
        Tokens {
            rest: text,
            min_len: self.min_len,
        }
    }

    /// Distinct terms of `text`.
    pub fn terms(&self, text: &str) -> BTreeSet<String> {
        self.tokens(text).collect()
    }
}

/// Iterator over the tokens of a string.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    /// Text not yet consumed.
    rest: &'a str,
    /// Shortest token kept.
    min_len: usize,
}

impl Iterator for Tokens<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            let start = self.rest.find(char::is_alphanumeric)?;
            let tail = &self.rest[start..];
            let end = tail
                .find(|c: char| !c.is_alphanumeric())
                .unwrap_or(tail.len());
            let (word, rest) = tail.split_at(end);
            self.rest = rest;
            if word.chars().count() >= self.min_len {
                return Some(word.to_lowercase());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<String> {
        Tokenizer::default().tokens(text).collect()
    }

    #[test]
    fn splits_on_punctuation_and_whitespace() {
        assert_eq!(
            tokens("Hello, world! It's Swift-UI."),
            vec!["hello", "world", "it", "s", "swift", "ui"]
        );
    }

    #[test]
    fn folds_case() {
        assert_eq!(tokens("CONCURRENCY Concurrency"), vec!["concurrency"; 2]);
    }

    #[test]
    fn keeps_digits_and_unicode_letters() {
        assert_eq!(tokens("iOS 13 café Ünïcode"), vec!["ios", "13", "café", "ünïcode"]);
    }

    #[test]
    fn empty_and_separator_only_input() {
        assert!(tokens("").is_empty());
        assert!(tokens("  -- ... !!").is_empty());
    }

    #[test]
    fn min_len_drops_short_tokens() {
        let tokenizer = Tokenizer::new(3);
        let kept: Vec<_> = tokenizer.tokens("a an the swift").collect();
        assert_eq!(kept, vec!["the", "swift"]);
    }

    #[test]
    fn zero_min_len_behaves_like_one() {
        assert_eq!(Tokenizer::new(0), Tokenizer::new(1));
        assert_eq!(Tokenizer::new(0).min_len(), 1);
    }

    #[test]
    fn min_len_counts_characters() {
        let kept: Vec<_> = Tokenizer::new(2).tokens("é ü éé").collect();
        assert_eq!(kept, vec!["éé"]);
    }

    #[test]
    fn restartable_and_deterministic() {
        let tokenizer = Tokenizer::default();
        let mut iter = tokenizer.tokens("one two three");
        assert_eq!(iter.next().as_deref(), Some("one"));
        let restart = iter.clone();
        assert_eq!(iter.collect::<Vec<_>>(), restart.collect::<Vec<_>>());
        assert_eq!(
            tokenizer.tokens("one two three").collect::<Vec<_>>(),
            tokenizer.tokens("one two three").collect::<Vec<_>>()
        );
    }

    #[test]
    fn terms_are_distinct() {
        let terms = Tokenizer::default().terms("swift Swift SWIFT ui");
        assert_eq!(terms.len(), 2);
        assert!(terms.contains("swift"));
    }
}
