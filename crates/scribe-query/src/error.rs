//! Error type for query syntax.
//!
//! Syntax errors never escape [`QueryParser::parse`](crate::QueryParser::parse); they
//! are reported by the strict entry points for callers that want to explain a query.

use std::{error::Error, fmt};

/// Syntax error with position information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Error message.
    pub message: String,
    /// Byte position in input where error occurred.
    pub position: usize,
    /// The original input string.
    pub input: String,
}

impl ParseError {
    /// Creates a new parse error.
    pub fn new(message: impl Into<String>, position: usize, input: &str) -> Self {
        Self {
            message: message.into(),
            position,
            input: input.to_string(),
        }
    }

    /// Returns a suggestion for common errors.
    pub fn suggestion(&self) -> Option<&'static str> {
        if self.message.contains("unclosed quote") {
            Some("Add a closing quote (\") to complete the phrase")
        } else {
            None
        }
    }

    /// Formats the error with a position indicator showing where the error occurred.
    pub fn format_with_context(&self) -> String {
        let mut result = String::new();
        result.push_str(&format!("query syntax error: {}\n", self.message));
        result.push_str(&format!("  {}\n", self.input));
        let column = self.input[..self.position.min(self.input.len())]
            .chars()
            .count();
        result.push_str(&format!("  {}^", " ".repeat(column)));
        if let Some(hint) = self.suggestion() {
            result.push_str(&format!("\nhint: {hint}"));
        }
        result
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_with_context())
    }
}

impl Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_points_at_position() {
        let err = ParseError::new("unclosed quote", 4, "abc \"def");
        let display = err.to_string();
        assert!(display.contains("unclosed quote"));
        assert!(display.contains("abc \"def"));
        assert!(display.contains("      ^"));
        assert!(display.contains("hint:"));
    }

    #[test]
    fn caret_counts_characters_not_bytes() {
        let err = ParseError::new("unclosed quote", "é ".len(), "é \"x");
        assert!(err.format_with_context().contains("    ^"));
        assert!(!err.format_with_context().contains("     ^"));
    }

    #[test]
    fn no_hint_for_unknown_message() {
        let err = ParseError::new("something else", 0, "x");
        assert!(err.suggestion().is_none());
        assert!(!err.to_string().contains("hint:"));
    }
}
