//! Failover pipeline over the configured provider adapters.
//!
//! Providers are invoked in their configured order and the first non-empty,
//! non-sentinel result is accepted. Linear short-circuit only: no retry
//! with backoff and no parallel dispatch; each adapter bounds its own call
//! with its configured timeout.

use tracing::{debug, info};

use crate::lookup::{Identifier, LookupOutcome, LookupRecord, ProviderKind};
use crate::provider::Provider;

pub struct FailoverPipeline {
    providers: Vec<Provider>,
}

impl FailoverPipeline {
    pub fn new(providers: Vec<Provider>) -> Self {
        Self { providers }
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn provider_kinds(&self) -> Vec<ProviderKind> {
        self.providers.iter().map(Provider::kind).collect()
    }

    /// Resolve one name to a record. Sentinel outcomes fall through to the
    /// next provider; when every provider is exhausted the record carries
    /// `NotFound`, unless every provider failed outright, in which case the
    /// error details are preserved for triage.
    pub async fn resolve(&self, name: &str) -> LookupRecord {
        let name = name.trim();
        let mut errors: Vec<String> = Vec::new();

        for provider in &self.providers {
            let kind = provider.kind();
            debug!("Trying provider {} for '{}'", kind, name);

            match provider.lookup(name).await {
                LookupOutcome::Found(candidates) => {
                    if let Some(candidate) = candidates.into_iter().next() {
                        info!("Resolved '{}' to {} via {}", name, candidate.gstin, kind);
                        return LookupRecord::found(name, candidate, kind);
                    }
                    debug!("Provider {} returned an empty result set for '{}'", kind, name);
                }
                LookupOutcome::NotFound => {
                    debug!("Provider {} found nothing for '{}'", kind, name);
                }
                LookupOutcome::NoTable => {
                    debug!("Provider {} saw no results table for '{}'", kind, name);
                }
                LookupOutcome::Error(detail) => {
                    debug!("Provider {} failed for '{}': {}", kind, name, detail);
                    errors.push(format!("{}: {}", kind, detail));
                }
            }
        }

        if !errors.is_empty() && errors.len() == self.providers.len() {
            // Every provider failed outright; keep the details for triage
            return LookupRecord::sentinel(name, Identifier::Error(errors.join("; ")), None);
        }

        LookupRecord::sentinel(name, Identifier::NotFound, None)
    }
}
