//! Configuration validation.
//!
//! Reports settings that load fine but will not behave the way they read.

use std::{collections::BTreeSet, fmt};

use crate::{Config, DEFAULT_QUALIFIERS};

/// Reserved key for the free-text remainder of a query.
const RESERVED_QUALIFIER: &str = "_query";

/// A non-fatal warning about the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A qualifier uses the reserved free-text key and will be ignored.
    ReservedQualifier,
    /// A qualifier is recognized by the parser but no search rule evaluates it,
    /// so any query using it matches nothing.
    UnsupportedQualifier {
        /// The qualifier name as configured.
        name: String,
    },
    /// A qualifier appears more than once.
    DuplicateQualifier {
        /// The qualifier name, lowercased.
        name: String,
    },
    /// `min_token_len = 0` behaves like 1.
    ZeroMinTokenLen,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReservedQualifier => {
                write!(f, "qualifier '{RESERVED_QUALIFIER}' is reserved and ignored")
            }
            Self::UnsupportedQualifier { name } => {
                write!(f, "qualifier '{name}' is not supported and never matches")
            }
            Self::DuplicateQualifier { name } => {
                write!(f, "qualifier '{name}' is listed more than once")
            }
            Self::ZeroMinTokenLen => write!(f, "min_token_len = 0 is treated as 1"),
        }
    }
}

/// Checks a loaded configuration for suspicious settings.
pub fn validate_config(config: &Config) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();
    let mut seen = BTreeSet::new();

    for name in &config.search.qualifiers {
        let lower = name.to_lowercase();
        if !seen.insert(lower.clone()) {
            warnings.push(ConfigWarning::DuplicateQualifier { name: lower });
            continue;
        }
        if lower == RESERVED_QUALIFIER {
            warnings.push(ConfigWarning::ReservedQualifier);
        } else if !DEFAULT_QUALIFIERS.contains(&lower.as_str()) {
            warnings.push(ConfigWarning::UnsupportedQualifier { name: name.clone() });
        }
    }

    if config.index.min_token_len == 0 {
        warnings.push(ConfigWarning::ZeroMinTokenLen);
    }

    warnings
}
