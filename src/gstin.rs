//! GSTIN pattern matching and validation.
//!
//! A GSTIN is India's 15-character Goods and Services Tax identification
//! number with a fixed per-position character-class layout:
//! 2 digits (state code), 5 uppercase letters + 4 digits + 1 uppercase letter
//! (PAN), 1 alphanumeric (entity code), literal `Z`, 1 alphanumeric
//! (check character).

use fancy_regex::Regex as FancyRegex;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

// Compile patterns once at startup.
static GSTIN_EXACT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][A-Z0-9]Z[A-Z0-9]$").unwrap()
});

// Extraction needs lookaround so a GSTIN embedded in a longer alphanumeric
// run (e.g. an order id or a hash) is not matched. The regex crate has no
// lookaround support, hence fancy_regex here.
static GSTIN_EMBEDDED_REGEX: Lazy<FancyRegex> = Lazy::new(|| {
    FancyRegex::new(
        r"(?<![0-9A-Za-z])[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][A-Z0-9]Z[A-Z0-9](?![0-9A-Za-z])",
    )
    .unwrap()
});

/// A validated 15-character GSTIN.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Gstin(String);

impl Gstin {
    /// Parse a candidate string. Returns `None` unless the whole string is a
    /// well-formed GSTIN. Case-exact: lowercase letters are rejected.
    pub fn parse(candidate: &str) -> Option<Self> {
        let candidate = candidate.trim();
        if GSTIN_EXACT_REGEX.is_match(candidate) {
            Some(Self(candidate.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Gstin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Gstin {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Gstin::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid GSTIN: {}", raw)))
    }
}

/// Extract every GSTIN-shaped substring from a block of arbitrary text.
///
/// Deduplicates while preserving first-occurrence order. Word-boundary
/// discipline applies: candidates embedded in longer alphanumeric runs are
/// skipped. Returns an empty vector when nothing matches.
pub fn extract(text: &str) -> Vec<Gstin> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    for m in GSTIN_EMBEDDED_REGEX.find_iter(text).flatten() {
        let candidate = m.as_str();
        if seen.insert(candidate.to_string()) {
            found.push(Gstin(candidate.to_string()));
        }
    }

    found
}
