//! Core lookup types: provider outcomes, result records, and sentinels.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::gstin::Gstin;

/// Which provider mechanism produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Headless browser session against the lookup portal
    Portal,
    /// Keyed JSON search API
    SearchApi,
    /// Keyless public search page scrape
    PageScrape,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Portal => write!(f, "portal"),
            ProviderKind::SearchApi => write!(f, "search_api"),
            ProviderKind::PageScrape => write!(f, "page_scrape"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "portal" => Ok(ProviderKind::Portal),
            "search_api" => Ok(ProviderKind::SearchApi),
            "page_scrape" => Ok(ProviderKind::PageScrape),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

/// One (identifier, matched legal name) pair returned by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub gstin: Gstin,
    /// The legal name displayed alongside the identifier, when the provider
    /// surfaces one (the portal table does; snippet extraction does not).
    pub legal_name: Option<String>,
}

/// Outcome of a single provider call.
///
/// Providers never surface errors to the caller: every network, parsing, or
/// timeout failure is converted to `Error(detail)` at the adapter boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// One or more candidates matched. Never constructed empty.
    Found(Vec<Candidate>),
    /// The provider ran but no matching identifier was present.
    NotFound,
    /// The expected results container was absent from the page
    /// (portal variant only).
    NoTable,
    /// Network, parsing, or API failure, with the raw failure description.
    Error(String),
}

impl LookupOutcome {
    /// True when this outcome carries at least one candidate.
    pub fn is_hit(&self) -> bool {
        matches!(self, LookupOutcome::Found(candidates) if !candidates.is_empty())
    }
}

/// The identifier column of a result record: a real GSTIN or a sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Identifier {
    Gstin(Gstin),
    NotFound,
    NoTable,
    Error(String),
}

impl Identifier {
    pub fn is_found(&self) -> bool {
        matches!(self, Identifier::Gstin(_))
    }

    /// Human-readable form used in the CSV export.
    pub fn label(&self) -> String {
        match self {
            Identifier::Gstin(gstin) => gstin.to_string(),
            Identifier::NotFound => "Not Found".to_string(),
            Identifier::NoTable => "No Table".to_string(),
            Identifier::Error(detail) => format!("Error: {}", detail),
        }
    }

    /// Inverse of [`Identifier::label`]. Returns `None` for strings that are
    /// neither a well-formed GSTIN nor a known sentinel label.
    pub fn from_label(label: &str) -> Option<Self> {
        if let Some(gstin) = Gstin::parse(label) {
            return Some(Identifier::Gstin(gstin));
        }
        match label {
            "Not Found" => Some(Identifier::NotFound),
            "No Table" => Some(Identifier::NoTable),
            _ => label
                .strip_prefix("Error: ")
                .map(|detail| Identifier::Error(detail.to_string())),
        }
    }
}

/// One output record of the batch driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupRecord {
    /// The input legal name, as supplied (trimmed).
    pub input_name: String,
    /// A validated GSTIN or a sentinel, never an empty value.
    pub identifier: Identifier,
    /// The legal name the provider matched against, if any.
    pub matched_name: Option<String>,
    /// The provider that produced the accepted result, if any did.
    pub provider: Option<ProviderKind>,
}

impl LookupRecord {
    pub fn found(
        input_name: impl Into<String>,
        candidate: Candidate,
        provider: ProviderKind,
    ) -> Self {
        Self {
            input_name: input_name.into(),
            identifier: Identifier::Gstin(candidate.gstin),
            matched_name: candidate.legal_name,
            provider: Some(provider),
        }
    }

    pub fn sentinel(
        input_name: impl Into<String>,
        identifier: Identifier,
        provider: Option<ProviderKind>,
    ) -> Self {
        Self {
            input_name: input_name.into(),
            identifier,
            matched_name: None,
            provider,
        }
    }

    /// The per-name escape hatch: a public search query a human can open to
    /// resolve the name manually.
    pub fn manual_lookup_url(&self) -> String {
        manual_lookup_url(&self.input_name)
    }
}

/// Build a public search URL for resolving a name by hand.
pub fn manual_lookup_url(name: &str) -> String {
    format!(
        "https://www.google.com/search?q={}",
        urlencoding::encode(&format!("\"{}\" gst number", name))
    )
}
