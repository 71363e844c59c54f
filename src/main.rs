use anyhow::{bail, Result};
use clap::Parser;
use std::path::Path;
use tracing::{info, warn};

use gstfinder::batch;
use gstfinder::cli::Args;
use gstfinder::config::{self, AppConfig};
use gstfinder::export;
use gstfinder::history::{self, RecentSearches};
use gstfinder::pipeline::FailoverPipeline;
use gstfinder::provider::build_providers;

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "gstfinder=info",
        1 => "gstfinder=debug",
        _ => "debug",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

/// CLI flags win over the config file.
fn apply_cli_overrides(config: &mut AppConfig, args: &Args) -> Result<()> {
    if args.enable_portal {
        config.portal.enabled = true;
    }
    if args.disable_portal {
        config.portal.enabled = false;
    }
    if args.enable_search_api {
        config.search_api.enabled = true;
    }
    if args.disable_search_api {
        config.search_api.enabled = false;
    }
    if args.enable_page_scrape {
        config.page_scrape.enabled = true;
    }
    if args.disable_page_scrape {
        config.page_scrape.enabled = false;
    }

    if let Some(rps) = args.http_rate_limit {
        config.rate_limit.http_requests_per_second = rps;
    }
    if let Some(mode) = &args.match_strictness {
        config.lookup.match_strictness = mode
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    // Handle --init first (before any other processing)
    if args.init {
        match AppConfig::create_default_config() {
            Ok(path) => {
                println!("Created default configuration file at: {}", path.display());
                println!("Edit this file to customize settings, then run gstfinder again.");
                return Ok(());
            }
            Err(e) => {
                eprintln!("Failed to create configuration file: {}", e);
                std::process::exit(1);
            }
        }
    }

    // Load configuration
    let mut app_config = match AppConfig::load() {
        Ok(cfg) => cfg,
        Err(config::ConfigError::FileNotFound(path)) => {
            // Config not found - prompt to create if interactive
            match AppConfig::prompt_create_config() {
                Ok(Some(created_path)) => {
                    println!(
                        "Created default configuration file at: {}",
                        created_path.display()
                    );
                    println!("Edit this file to customize settings, then run gstfinder again.");
                    return Ok(());
                }
                Ok(None) => {
                    eprintln!("Configuration file not found at: {}", path.display());
                    eprintln!("Run with --init to create a default configuration file.");
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Failed to create configuration file: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Invalid arguments: {}", e);
        std::process::exit(1);
    }

    apply_cli_overrides(&mut app_config, &args)?;

    // Recent-search history: session state, persisted between runs unless
    // --no-history is given
    let history_path = if args.no_history {
        None
    } else {
        history::default_history_path()
    };
    let mut recent = history_path
        .as_deref()
        .map(RecentSearches::load)
        .unwrap_or_default();

    if args.clear_recent {
        recent.clear();
        if let Some(path) = &history_path {
            if let Err(e) = recent.save(path) {
                warn!("Failed to persist cleared history: {}", e);
            }
        }
        println!("Recent searches cleared.");
        if args.name.is_none() && args.input_file.is_none() {
            return Ok(());
        }
    }

    // Build the failover pipeline from the configured provider order
    let providers = build_providers(&app_config)?;
    if providers.is_empty() {
        bail!("No providers enabled; enable at least one in config or via --enable-* flags");
    }
    let pipeline = FailoverPipeline::new(providers);
    info!(
        "Provider failover order: {}",
        pipeline
            .provider_kinds()
            .iter()
            .map(|kind| kind.to_string())
            .collect::<Vec<_>>()
            .join(" -> ")
    );

    // Resolve: batch file or a single name through the same pipeline call
    let records = if let Some(input_file) = &args.input_file {
        let raw_names = batch::parse_name_file(Path::new(input_file))?;
        batch::run_batch(&pipeline, raw_names, &mut recent, !args.no_progress).await?
    } else {
        let name = args.name.as_deref().unwrap_or_default();
        vec![batch::run_single(&pipeline, name, &mut recent).await?]
    };

    if let Some(path) = &history_path {
        if let Err(e) = recent.save(path) {
            warn!("Failed to persist recent-search history: {}", e);
        }
    }

    // Export
    let output_dir = args.get_output_dir();
    std::fs::create_dir_all(&output_dir)?;
    let output_path = Path::new(&output_dir).join(args.get_output_filename());
    match args.output_format.as_str() {
        "json" => export::export_json(&records, &output_path)?,
        _ => export::export_csv(&records, &output_path)?,
    }

    export::print_lookup_summary(&records);
    if !recent.is_empty() {
        println!(
            "Recent searches: {}",
            recent.most_recent_first().join(", ")
        );
    }
    println!("Results saved to: {}", output_path.display());

    Ok(())
}
