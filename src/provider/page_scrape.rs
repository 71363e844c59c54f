//! Keyless page-scrape provider.
//!
//! Last-resort fallback: fetches a public search results page over plain
//! HTTP (no API key) and runs GSTIN extraction over the visible page text.

use anyhow::{anyhow, Result};
use reqwest::Client;
use scraper::Html;
use std::time::Duration;
use tracing::debug;

use crate::config::{HttpConfig, PageScrapeConfig};
use crate::gstin;
use crate::lookup::{Candidate, LookupOutcome};
use crate::provider::search_query;
use crate::rate_limit::SharedRateLimiter;

pub struct PageScrapeProvider {
    client: Client,
    endpoint: String,
    limiter: SharedRateLimiter,
}

impl PageScrapeProvider {
    pub fn new(
        config: &PageScrapeConfig,
        http: &HttpConfig,
        limiter: SharedRateLimiter,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(http.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            limiter,
        })
    }

    /// Resolve a name by scraping the public search page. One round trip;
    /// failures fold into the returned outcome.
    pub async fn lookup(&self, name: &str) -> LookupOutcome {
        self.limiter.acquire().await;

        let html = match self.fetch_results_page(name).await {
            Ok(html) => html,
            Err(e) => return LookupOutcome::Error(e.to_string()),
        };

        match extract_from_page(&html) {
            Some(found) => {
                debug!("page_scrape matched {} for '{}'", found.gstin, name);
                LookupOutcome::Found(vec![found])
            }
            None => {
                debug!("page_scrape: no GSTIN on results page for '{}'", name);
                LookupOutcome::NotFound
            }
        }
    }

    async fn fetch_results_page(&self, name: &str) -> Result<String> {
        let query = search_query(name);
        debug!("page_scrape query: {}", query);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("search page returned HTTP {}", response.status()));
        }

        response
            .text()
            .await
            .map_err(|e| anyhow!("Failed to read search page body: {}", e))
    }
}

/// Run GSTIN extraction over the visible text of a results page.
fn extract_from_page(html: &str) -> Option<Candidate> {
    let document = Html::parse_document(html);
    let text = document.root_element().text().collect::<Vec<_>>().join(" ");

    gstin::extract(&text).into_iter().next().map(|found| Candidate {
        gstin: found,
        legal_name: None,
    })
}
