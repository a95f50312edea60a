//! Query lexer (tokenizer).
//!
//! Converts a raw search string into a stream of tokens for the parser. The lexer
//! has no notion of which qualifier names are recognized; every `name:value` form
//! is emitted as a [`Token::Qualifier`] and the parser decides what to do with it.

use std::{iter::Peekable, str::Chars};

use crate::error::ParseError;

/// A token in the query language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A bare word.
    Word(String),

    /// A quoted phrase (the quotes are stripped, content preserved).
    Phrase(String),

    /// A `name:value` pair, e.g. `year:2015` or `transcript:"swift ui"`.
    Qualifier {
        /// Name before the colon, as written.
        name: String,
        /// Value after the colon, with surrounding quotes removed.
        value: String,
        /// The exact source text of the pair, used when it falls back to free text.
        raw: String,
    },
}

/// Tokenizes a query string.
struct Lexer<'a> {
    /// The original input string.
    input: &'a str,
    /// Character iterator with one-character lookahead.
    chars: Peekable<Chars<'a>>,
    /// Current byte position in input.
    position: usize,
    /// When set, an unclosed quote runs to the end of input instead of failing.
    lenient: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    fn new(input: &'a str, lenient: bool) -> Self {
        Self {
            input,
            chars: input.chars().peekable(),
            position: 0,
            lenient,
        }
    }

    /// Creates an error at a specific position.
    fn error_at(&self, message: impl Into<String>, position: usize) -> ParseError {
        ParseError::new(message, position, self.input)
    }

    /// Tokenizes the entire input, returning all tokens or an error.
    fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();

        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }

        Ok(tokens)
    }

    /// Returns the next token, or None if at end of input.
    fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        self.skip_whitespace();

        let Some(&ch) = self.chars.peek() else {
            return Ok(None);
        };

        if ch == '"' {
            let (content, _) = self.read_quoted()?;
            return Ok(Some(Token::Phrase(content)));
        }

        self.read_word_or_qualifier()
    }

    /// Reads a quoted string, returning its content without the quotes and whether
    /// the closing quote was found.
    fn read_quoted(&mut self) -> Result<(String, bool), ParseError> {
        let start_pos = self.position;
        self.advance(); // consume opening quote

        let mut content = String::new();

        loop {
            match self.chars.peek() {
                Some(&'"') => {
                    self.advance(); // consume closing quote
                    return Ok((content, true));
                }
                Some(&ch) => {
                    content.push(ch);
                    self.advance();
                }
                None if self.lenient => return Ok((content, false)),
                None => return Err(self.error_at("unclosed quote", start_pos)),
            }
        }
    }

    /// Reads a bare word or a `name:value` qualifier.
    fn read_word_or_qualifier(&mut self) -> Result<Option<Token>, ParseError> {
        let start_pos = self.position;
        let mut word = String::new();

        while let Some(&ch) = self.chars.peek() {
            if ch.is_whitespace() || ch == '"' {
                break;
            }

            // A colon after a non-empty name starts the qualifier value
            if ch == ':' && !word.is_empty() {
                self.advance();
                return self.read_qualifier_value(word, start_pos).map(Some);
            }

            word.push(ch);
            self.advance();
        }

        if word.is_empty() {
            return Ok(None);
        }

        Ok(Some(Token::Word(word)))
    }

    /// Reads the value half of a qualifier whose name and colon were consumed.
    ///
    /// A name followed directly by whitespace or end of input has no value and
    /// is returned as a plain word (`year:`). So is a value whose quote never
    /// closes, which only happens in lenient mode.
    fn read_qualifier_value(&mut self, name: String, start_pos: usize) -> Result<Token, ParseError> {
        let value = match self.chars.peek() {
            Some(&'"') => match self.read_quoted()? {
                (value, true) => value,
                (_, false) => {
                    return Ok(Token::Word(self.input[start_pos..self.position].to_string()));
                }
            },
            Some(&ch) if !ch.is_whitespace() => {
                let mut value = String::new();
                while let Some(&ch) = self.chars.peek() {
                    if ch.is_whitespace() || ch == '"' {
                        break;
                    }
                    value.push(ch);
                    self.advance();
                }
                value
            }
            _ => return Ok(Token::Word(format!("{name}:"))),
        };

        Ok(Token::Qualifier {
            name,
            value,
            raw: self.input[start_pos..self.position].to_string(),
        })
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Advances to the next character.
    fn advance(&mut self) {
        if let Some(ch) = self.chars.next() {
            self.position += ch.len_utf8();
        }
    }
}

/// Tokenizes a query string, failing on malformed syntax such as an unclosed quote.
pub fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    Lexer::new(input, false).tokenize()
}

/// Tokenizes a query string without ever failing.
///
/// An unclosed quote extends to the end of the input. Inside a qualifier value the
/// whole `name:"...` run becomes a plain word instead.
pub fn tokenize_lenient(input: &str) -> Vec<Token> {
    // Lenient lexing has no failure path left
    Lexer::new(input, true).tokenize().unwrap_or_default()
}
