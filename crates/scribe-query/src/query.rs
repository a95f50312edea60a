//! Parsed query representation.
//!
//! A [`ParsedQuery`] is the qualifier map plus the free-text remainder of a raw
//! search string.

use std::{collections::BTreeMap, fmt};

/// Reserved key under which the free-text remainder is exposed.
pub const FREE_TEXT_KEY: &str = "_query";

/// Qualifier name to value mapping.
///
/// Names are stored lowercased; lookups are case-insensitive. Inserting a name that is
/// already present replaces the earlier value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualifierMap {
    /// Lowercased name to value.
    entries: BTreeMap<String, String>,
}

impl QualifierMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a qualifier, returning the value it replaced.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) -> Option<String> {
        self.entries.insert(name.to_lowercase(), value.into())
    }

    /// Returns the value for a qualifier name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Returns true if the qualifier is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over `(name, value)` pairs, names lowercased.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of qualifiers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no qualifiers are present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: AsRef<str>, V: Into<String>> FromIterator<(N, V)> for QualifierMap {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.insert(name.as_ref(), value);
        }
        map
    }
}

/// A structured query: qualifiers plus free text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    /// Recognized qualifiers.
    qualifiers: QualifierMap,
    /// Non-qualifier text, single-space separated.
    free_text: String,
}

impl ParsedQuery {
    /// Creates a query from its parts, normalizing whitespace in the free text.
    pub fn new(qualifiers: QualifierMap, free_text: &str) -> Self {
        Self {
            qualifiers,
            free_text: free_text.split_whitespace().collect::<Vec<_>>().join(" "),
        }
    }

    /// The recognized qualifiers.
    pub fn qualifiers(&self) -> &QualifierMap {
        &self.qualifiers
    }

    /// Value of one qualifier.
    pub fn qualifier(&self, name: &str) -> Option<&str> {
        self.qualifiers.get(name)
    }

    /// The free-text remainder (possibly empty).
    pub fn free_text(&self) -> &str {
        &self.free_text
    }

    /// Looks up a key, treating [`FREE_TEXT_KEY`] as the free-text remainder.
    ///
    /// Returns `None` for the reserved key when there is no free text.
    pub fn get(&self, key: &str) -> Option<&str> {
        if key == FREE_TEXT_KEY {
            (!self.free_text.is_empty()).then_some(self.free_text.as_str())
        } else {
            self.qualifiers.get(key)
        }
    }

    /// Returns true if the query has neither qualifiers nor free text.
    pub fn is_empty(&self) -> bool {
        self.qualifiers.is_empty() && self.free_text.is_empty()
    }

    /// Formats the query back into a canonical query string.
    ///
    /// Qualifiers come first in name order; values containing whitespace are quoted.
    pub fn to_query_string(&self) -> String {
        let mut parts: Vec<String> = self
            .qualifiers
            .iter()
            .map(|(name, value)| {
                if value.chars().any(char::is_whitespace) {
                    format!("{name}:\"{value}\"")
                } else {
                    format!("{name}:{value}")
                }
            })
            .collect();
        if !self.free_text.is_empty() {
            parts.push(self.free_text.clone());
        }
        parts.join(" ")
    }
}

impl fmt::Display for ParsedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.qualifiers.iter() {
            writeln!(f, "{name} = {value:?}")?;
        }
        writeln!(f, "{FREE_TEXT_KEY} = {:?}", self.free_text)
    }
}
