use clap::Parser;

use crate::config::MatchStrictness;

#[derive(Parser, Debug)]
#[command(name = "gstfinder")]
#[command(about = "Batch GSTIN lookup for company legal names")]
#[command(version)]
pub struct Args {
    /// Create default configuration file at ./config/gstfinder.toml
    #[arg(long)]
    pub init: bool,

    /// A single company legal name to look up
    #[arg(short, long)]
    pub name: Option<String>,

    /// Path to a CSV, JSON, or TXT file containing company legal names
    /// CSV: one name per line, or a column named "name"
    /// JSON: array of name strings, or array of objects with a "name" field
    #[arg(short, long, value_name = "FILE")]
    pub input_file: Option<String>,

    /// Output format: 'csv' (default) or 'json'
    #[arg(short = 'f', long, default_value = "csv")]
    pub output_format: String,

    /// Output directory for the results file (defaults to current directory)
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Output filename (extension will be set based on format if not provided)
    #[arg(short, long, default_value = "gst_results")]
    pub output: String,

    /// Verbose logging (use -v for DEBUG of this crate, -vv for DEBUG of everything)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Legal-name match strictness: 'substring' or 'exact' (overrides config)
    #[arg(long, value_name = "MODE")]
    pub match_strictness: Option<String>,

    /// Maximum HTTP provider requests per second (0 = unlimited, overrides config)
    #[arg(long, value_name = "RPS")]
    pub http_rate_limit: Option<u32>,

    /// Enable the portal provider (overrides config)
    #[arg(long, conflicts_with = "disable_portal")]
    pub enable_portal: bool,

    /// Disable the portal provider (overrides config)
    #[arg(long)]
    pub disable_portal: bool,

    /// Enable the search API provider (overrides config)
    #[arg(long, conflicts_with = "disable_search_api")]
    pub enable_search_api: bool,

    /// Disable the search API provider (overrides config)
    #[arg(long)]
    pub disable_search_api: bool,

    /// Enable the page-scrape provider (overrides config)
    #[arg(long, conflicts_with = "disable_page_scrape")]
    pub enable_page_scrape: bool,

    /// Disable the page-scrape provider (overrides config)
    #[arg(long)]
    pub disable_page_scrape: bool,

    /// Clear the recent-search history and exit (unless a lookup is also requested)
    #[arg(long)]
    pub clear_recent: bool,

    /// Do not load or persist the recent-search history
    #[arg(long)]
    pub no_history: bool,
}

impl Args {
    /// Check if running in batch mode (--input-file provided)
    pub fn is_batch_mode(&self) -> bool {
        self.input_file.is_some()
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.init && !self.clear_recent {
            match (&self.name, &self.input_file) {
                (None, None) => {
                    return Err(
                        "A lookup target is required (use --name or --input-file for batch mode)"
                            .to_string(),
                    )
                }
                (Some(_), Some(_)) => {
                    return Err("Use either --name or --input-file, not both".to_string())
                }
                (Some(name), None) if name.trim().is_empty() => {
                    return Err("Name cannot be empty".to_string())
                }
                _ => {}
            }
        }

        if !["csv", "json"].contains(&self.output_format.as_str()) {
            return Err("Output format must be 'csv' or 'json'".to_string());
        }

        if let Some(mode) = &self.match_strictness {
            mode.parse::<MatchStrictness>()?;
        }

        Ok(())
    }

    pub fn get_output_dir(&self) -> String {
        self.output_dir.clone().unwrap_or_else(|| ".".to_string())
    }

    /// Output filename with the format extension applied unless the user
    /// already provided one.
    pub fn get_output_filename(&self) -> String {
        if self.output.contains('.') {
            self.output.clone()
        } else {
            format!("{}.{}", self.output, self.output_format)
        }
    }
}
