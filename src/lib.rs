// Allow dead code for public API functions that may not be used internally
// but are part of the library's exposed interface
#![allow(dead_code)]

pub mod batch;
pub mod browser;
pub mod cli;
pub mod config;
pub mod export;
pub mod gstin;
pub mod history;
pub mod lookup;
pub mod pipeline;
pub mod provider;
pub mod rate_limit;

pub use gstin::Gstin;
pub use history::RecentSearches;
pub use lookup::{Identifier, LookupOutcome, LookupRecord, ProviderKind};
pub use pipeline::FailoverPipeline;
