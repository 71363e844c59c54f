//! Configuration management for gstfinder
//!
//! All configuration is loaded from `./config/gstfinder.toml`.
//! No hardcoded defaults exist in source code - all defaults are in the
//! config template.

use serde::Deserialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::lookup::ProviderKind;

/// Configuration file path relative to working directory
pub const CONFIG_PATH: &str = "./config/gstfinder.toml";

/// Default configuration file content - this is the ONLY place defaults exist
pub const DEFAULT_CONFIG: &str = include_str!("../config/gstfinder.toml");

/// Environment variable consulted when `search_api.api_key` is empty, so the
/// credential can stay out of the config file.
pub const SEARCH_API_KEY_ENV: &str = "GSTFINDER_SEARCH_API_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found at {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid URL in '{field}': {url}")]
    InvalidUrl { field: String, url: String },

    #[error("Configuration field '{field}' cannot be empty")]
    EmptyRequired { field: String },

    #[error("Duplicate provider '{0}' in lookup.provider_order")]
    DuplicateProvider(ProviderKind),
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub lookup: LookupConfig,
    pub portal: PortalConfig,
    pub search_api: SearchApiConfig,
    pub page_scrape: PageScrapeConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

/// How a scraped legal name must match the input name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrictness {
    /// Case-insensitive substring containment (source-of-truth heuristic)
    Substring,
    /// Case-insensitive equality after whitespace normalization
    Exact,
}

impl FromStr for MatchStrictness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "substring" => Ok(MatchStrictness::Substring),
            "exact" => Ok(MatchStrictness::Exact),
            other => Err(format!(
                "match strictness must be 'substring' or 'exact', got '{}'",
                other
            )),
        }
    }
}

/// Pipeline composition configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LookupConfig {
    /// Failover order; the first provider with a non-empty result wins
    pub provider_order: Vec<ProviderKind>,
    pub match_strictness: MatchStrictness,
}

/// Interactive portal provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    pub enabled: bool,
    pub search_url: String,
    pub search_input_selector: String,
    pub results_table_selector: String,
    pub page_load_delay_ms: u64,
    pub settle_delay_ms: u64,
}

/// Keyed search API provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchApiConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub api_key: String,
    pub max_results: usize,
    pub timeout_secs: u64,
}

impl SearchApiConfig {
    /// The configured key, falling back to the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        if !self.api_key.is_empty() {
            return Some(self.api_key.clone());
        }
        std::env::var(SEARCH_API_KEY_ENV)
            .ok()
            .filter(|key| !key.is_empty())
    }
}

/// Keyless page-scrape provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PageScrapeConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub timeout_secs: u64,
}

/// HTTP pacing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum HTTP provider requests per second (0 = unlimited)
    #[serde(default)]
    pub http_requests_per_second: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            http_requests_per_second: 0,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(Path::new(CONFIG_PATH))
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.user_agent.is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: "http.user_agent".to_string(),
            });
        }
        if self.http.request_timeout_secs == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "http.request_timeout_secs".to_string(),
            });
        }

        if self.lookup.provider_order.is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: "lookup.provider_order".to_string(),
            });
        }
        let mut seen = Vec::new();
        for kind in &self.lookup.provider_order {
            if seen.contains(kind) {
                return Err(ConfigError::DuplicateProvider(*kind));
            }
            seen.push(*kind);
        }

        Self::validate_url("portal.search_url", &self.portal.search_url)?;
        Self::validate_url("search_api.endpoint", &self.search_api.endpoint)?;
        Self::validate_url("page_scrape.endpoint", &self.page_scrape.endpoint)?;

        if self.portal.search_input_selector.is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: "portal.search_input_selector".to_string(),
            });
        }
        if self.portal.results_table_selector.is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: "portal.results_table_selector".to_string(),
            });
        }
        if self.search_api.max_results == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "search_api.max_results".to_string(),
            });
        }

        Ok(())
    }

    fn validate_url(field: &str, url: &str) -> Result<(), ConfigError> {
        if url.starts_with("https://") || url.starts_with("http://") {
            Ok(())
        } else {
            Err(ConfigError::InvalidUrl {
                field: field.to_string(),
                url: url.to_string(),
            })
        }
    }

    /// Create default configuration file at the standard location
    pub fn create_default_config() -> Result<PathBuf, ConfigError> {
        let path = Path::new(CONFIG_PATH);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = fs::File::create(path)?;
        file.write_all(DEFAULT_CONFIG.as_bytes())?;

        Ok(path.to_path_buf())
    }

    /// Check if stdin is a TTY (interactive terminal)
    pub fn is_interactive() -> bool {
        atty::is(atty::Stream::Stdin)
    }

    /// Prompt user to create default config (only in interactive mode)
    pub fn prompt_create_config() -> Result<Option<PathBuf>, ConfigError> {
        if !Self::is_interactive() {
            return Ok(None);
        }

        print!("Configuration file not found. Create default config? [Y/n] ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim().to_lowercase();

        if input.is_empty() || input == "y" || input == "yes" {
            let path = Self::create_default_config()?;
            Ok(Some(path))
        } else {
            Ok(None)
        }
    }
}
