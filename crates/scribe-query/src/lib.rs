//! Qualifier query parsing for scribe transcript search.
//!
//! A raw search string is split into recognized qualifiers and free text:
//!
//! - **Qualifiers**: `year:2015`, `transcript:"swift ui"` - filters on session attributes
//! - **Free text**: everything else, in original order, single-space separated
//! - **Phrases**: `"main actor"` - quotes group words that stay in the free text
//!
//! Qualifier names are matched case-insensitively against a configured set. A
//! `name:value` whose name is not recognized is ordinary free text. Parsing never
//! fails; malformed syntax degrades to free text.
//!
//! # Example
//!
//! ```
//! use scribe_query::{FREE_TEXT_KEY, QueryParser};
//!
//! let parser = QueryParser::new(["year", "session"]);
//! let query = parser.parse("year:2015 swift concurrency");
//! assert_eq!(query.qualifier("year"), Some("2015"));
//! assert_eq!(query.get(FREE_TEXT_KEY), Some("swift concurrency"));
//! ```

#![warn(missing_docs)]

mod error;
mod lexer;
mod parser;
mod query;

pub use error::ParseError;
pub use lexer::{Token, tokenize, tokenize_lenient};
pub use parser::{QueryParser, parse};
pub use query::{FREE_TEXT_KEY, ParsedQuery, QualifierMap};
