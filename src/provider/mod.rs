//! Provider adapters for resolving a company name to a GSTIN.
//!
//! Three capability variants sit behind one dispatch enum: an interactive
//! portal session, a keyed search API, and a keyless page scrape. Every
//! variant honors the same contract: `lookup(name)` performs exactly one
//! round trip and never surfaces an error - failures become the
//! `LookupOutcome::Error` sentinel at this boundary.

pub mod page_scrape;
pub mod portal;
pub mod search_api;

pub use page_scrape::PageScrapeProvider;
pub use portal::PortalProvider;
pub use search_api::SearchApiProvider;

use anyhow::Result;
use tracing::warn;

use crate::config::{AppConfig, MatchStrictness};
use crate::lookup::{LookupOutcome, ProviderKind};
use crate::rate_limit::SharedRateLimiter;

/// A configured provider adapter.
pub enum Provider {
    Portal(PortalProvider),
    SearchApi(SearchApiProvider),
    PageScrape(PageScrapeProvider),
}

impl Provider {
    pub fn kind(&self) -> ProviderKind {
        match self {
            Provider::Portal(_) => ProviderKind::Portal,
            Provider::SearchApi(_) => ProviderKind::SearchApi,
            Provider::PageScrape(_) => ProviderKind::PageScrape,
        }
    }

    /// Resolve a name through this provider. Infallible by contract: all
    /// failure modes are folded into the returned outcome.
    pub async fn lookup(&self, name: &str) -> LookupOutcome {
        match self {
            Provider::Portal(provider) => provider.lookup(name).await,
            Provider::SearchApi(provider) => provider.lookup(name).await,
            Provider::PageScrape(provider) => provider.lookup(name).await,
        }
    }
}

/// Build the configured providers in failover order, skipping disabled ones.
pub fn build_providers(config: &AppConfig) -> Result<Vec<Provider>> {
    let limiter = SharedRateLimiter::new(config.rate_limit.http_requests_per_second);
    let mut providers = Vec::new();

    for kind in &config.lookup.provider_order {
        match kind {
            ProviderKind::Portal => {
                if config.portal.enabled {
                    providers.push(Provider::Portal(PortalProvider::new(
                        config.portal.clone(),
                        config.lookup.match_strictness,
                    )));
                }
            }
            ProviderKind::SearchApi => {
                if config.search_api.enabled {
                    if config.search_api.resolve_api_key().is_none() {
                        warn!(
                            "search_api enabled but no API key configured; \
                             requests will be sent unauthenticated"
                        );
                    }
                    providers.push(Provider::SearchApi(SearchApiProvider::new(
                        &config.search_api,
                        &config.http,
                        limiter.clone(),
                    )?));
                }
            }
            ProviderKind::PageScrape => {
                if config.page_scrape.enabled {
                    providers.push(Provider::PageScrape(PageScrapeProvider::new(
                        &config.page_scrape,
                        &config.http,
                        limiter.clone(),
                    )?));
                }
            }
        }
    }

    Ok(providers)
}

/// The keyword query both HTTP variants send to their search endpoint.
pub fn search_query(name: &str) -> String {
    format!("{} gst number", name)
}

/// Whether a scraped legal name matches the input name under the configured
/// strictness.
pub fn name_matches(input: &str, legal_name: &str, strictness: MatchStrictness) -> bool {
    match strictness {
        MatchStrictness::Substring => legal_name
            .to_lowercase()
            .contains(&input.trim().to_lowercase()),
        MatchStrictness::Exact => {
            normalize_whitespace(legal_name).to_lowercase()
                == normalize_whitespace(input).to_lowercase()
        }
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
