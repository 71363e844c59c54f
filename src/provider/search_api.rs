//! Keyed search API provider.
//!
//! Issues a keyword query ("<name> gst number") to a JSON search API,
//! scans a bounded number of result snippets, and extracts the first
//! GSTIN-shaped string found.

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::{HttpConfig, SearchApiConfig};
use crate::gstin;
use crate::lookup::{Candidate, LookupOutcome};
use crate::provider::search_query;
use crate::rate_limit::SharedRateLimiter;

/// One organic result from the search API response.
#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    link: Option<String>,
}

/// Search API response envelope.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic_results: Vec<SearchResult>,
}

pub struct SearchApiProvider {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    max_results: usize,
    limiter: SharedRateLimiter,
}

impl SearchApiProvider {
    pub fn new(
        config: &SearchApiConfig,
        http: &HttpConfig,
        limiter: SharedRateLimiter,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(http.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.resolve_api_key(),
            max_results: config.max_results,
            limiter,
        })
    }

    /// Resolve a name through the search API. One round trip; failures fold
    /// into the returned outcome.
    pub async fn lookup(&self, name: &str) -> LookupOutcome {
        self.limiter.acquire().await;

        let snippets = match self.query(name).await {
            Ok(snippets) => snippets,
            Err(e) => return LookupOutcome::Error(e.to_string()),
        };

        for snippet in &snippets {
            if let Some(found) = gstin::extract(snippet).into_iter().next() {
                debug!("search_api matched {} for '{}'", found, name);
                return LookupOutcome::Found(vec![Candidate {
                    gstin: found,
                    legal_name: None,
                }]);
            }
        }

        debug!(
            "search_api: no GSTIN in {} snippets for '{}'",
            snippets.len(),
            name
        );
        LookupOutcome::NotFound
    }

    /// Fetch up to `max_results` result snippets for a name.
    async fn query(&self, name: &str) -> Result<Vec<String>> {
        let query = search_query(name);
        debug!("search_api query: {}", query);

        let num = self.max_results.to_string();
        let mut request = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query.as_str()), ("num", num.as_str())]);
        if let Some(key) = &self.api_key {
            request = request.query(&[("api_key", key.as_str())]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("search API returned HTTP {}", response.status()));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("malformed search API payload: {}", e))?;

        let snippets = parsed
            .organic_results
            .into_iter()
            .take(self.max_results)
            .map(|result| {
                [result.title, result.snippet, result.link]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();

        Ok(snippets)
    }
}
