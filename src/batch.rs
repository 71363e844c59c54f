//! Batch lookup driver: input parsing and the sequential resolve loop.
//!
//! Supports:
//! - CSV files with one name per line or a "name" column
//! - JSON files with an array of name strings or objects with a "name" field
//! - Plain text files with one name per line
//! - Error resilience (a failed name yields an Error record, never aborts)

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::history::RecentSearches;
use crate::lookup::LookupRecord;
use crate::pipeline::FailoverPipeline;

/// Maximum number of names accepted in one batch.
pub const MAX_BATCH_NAMES: usize = 1000;

#[derive(Error, Debug, PartialEq)]
pub enum BatchError {
    #[error("no input names to look up")]
    NoInput,

    #[error("too many input names: {0} exceeds the limit of {max}", max = MAX_BATCH_NAMES)]
    TooManyNames(usize),
}

/// Input format for batch name files
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputFormat {
    Csv,
    Json,
    Text,
}

impl InputFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("csv") => Some(Self::Csv),
            Some("json") => Some(Self::Json),
            Some("txt") => Some(Self::Text),
            _ => None,
        }
    }
}

/// Parse a name list from a file (auto-detects format from extension)
pub fn parse_name_file(path: &Path) -> Result<Vec<String>> {
    let format = InputFormat::from_path(path).context(format!(
        "Cannot determine input format from file extension. Expected .csv, .json or .txt: {}",
        path.display()
    ))?;

    let content = fs::read_to_string(path)
        .context(format!("Failed to read input file: {}", path.display()))?;

    match format {
        InputFormat::Csv => parse_csv_names(&content),
        InputFormat::Json => parse_json_names(&content),
        InputFormat::Text => Ok(parse_name_lines(&content)),
    }
}

/// Parse names from CSV content.
///
/// Supports two formats:
/// 1. One name per line (no header)
/// 2. CSV with a "name" column header
pub fn parse_csv_names(content: &str) -> Result<Vec<String>> {
    let lines: Vec<&str> = content.lines().collect();
    if lines.is_empty() {
        return Ok(Vec::new());
    }

    let first_line = lines[0].to_lowercase();
    let has_header = first_line.contains("name");

    if has_header {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader.headers().context("Failed to read CSV headers")?.clone();
        let name_idx = headers
            .iter()
            .position(|h| h.to_lowercase().trim() == "name")
            .context("CSV must have a 'name' column when using headers")?;

        let mut names = Vec::new();
        for result in reader.records() {
            let record = result.context("Failed to parse CSV record")?;
            if let Some(name) = record
                .get(name_idx)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
            {
                names.push(name);
            }
        }
        Ok(names)
    } else {
        // One name per line; a legal name may contain commas, so the whole
        // line is the value
        Ok(parse_name_lines(content))
    }
}

/// Parse one name per line, skipping blanks and `#` comments.
fn parse_name_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Parse names from JSON content.
///
/// Supports three formats:
/// 1. Array of name strings: ["Acme Industries", "Zenith Traders"]
/// 2. Array of objects with a "name" field: [{"name": "Acme Industries"}]
/// 3. Object with a "names" array: {"names": ["Acme Industries"]}
pub fn parse_json_names(content: &str) -> Result<Vec<String>> {
    let value: serde_json::Value =
        serde_json::from_str(content).context("Failed to parse JSON content")?;

    let names = match &value {
        serde_json::Value::Array(arr) => parse_json_array(arr),

        serde_json::Value::Object(obj) => {
            if let Some(names_value) = obj.get("names") {
                if let serde_json::Value::Array(arr) = names_value {
                    parse_json_array(arr)
                } else {
                    bail!("'names' field must be an array");
                }
            } else {
                bail!("JSON object must have a 'names' array field");
            }
        }

        _ => bail!("JSON must be an array of names or an object with a 'names' field"),
    };

    Ok(names)
}

fn parse_json_array(arr: &[serde_json::Value]) -> Vec<String> {
    let mut names = Vec::new();

    for item in arr {
        match item {
            serde_json::Value::String(name) => {
                let name = name.trim();
                if !name.is_empty() {
                    names.push(name.to_string());
                }
            }
            serde_json::Value::Object(obj) => {
                if let Some(serde_json::Value::String(name)) = obj.get("name") {
                    let name = name.trim();
                    if !name.is_empty() {
                        names.push(name.to_string());
                    }
                }
            }
            _ => {
                // Skip invalid entries
            }
        }
    }

    names
}

/// Trim, drop empties, deduplicate preserving first occurrence, and enforce
/// the batch bounds. Rejects empty batches and oversize batches outright
/// rather than truncating.
pub fn prepare_names(raw: Vec<String>) -> Result<Vec<String>, BatchError> {
    let mut names = Vec::new();
    for name in raw {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        if !names.iter().any(|existing| existing == name) {
            names.push(name.to_string());
        }
    }

    if names.is_empty() {
        return Err(BatchError::NoInput);
    }
    if names.len() > MAX_BATCH_NAMES {
        return Err(BatchError::TooManyNames(names.len()));
    }

    Ok(names)
}

/// Run the full batch: one name resolved to completion before the next
/// begins. Always produces exactly one record per (deduplicated) input name,
/// in input order; a failure on one name never aborts the rest.
pub async fn run_batch(
    pipeline: &FailoverPipeline,
    raw_names: Vec<String>,
    history: &mut RecentSearches,
    show_progress: bool,
) -> Result<Vec<LookupRecord>, BatchError> {
    let names = prepare_names(raw_names)?;
    let total = names.len();

    let progress = if show_progress {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(bar)
    } else {
        None
    };

    let mut records = Vec::with_capacity(total);
    for (index, name) in names.iter().enumerate() {
        if let Some(bar) = &progress {
            bar.set_message(name.clone());
        }

        history.record(name);
        let record = pipeline.resolve(name).await;
        records.push(record);

        if let Some(bar) = &progress {
            bar.inc(1);
        }
        info!(
            "Completed {}/{} ({:.0}%): {}",
            index + 1,
            total,
            (index + 1) as f64 * 100.0 / total as f64,
            name
        );
    }

    if let Some(bar) = &progress {
        bar.finish_with_message("done");
    }

    Ok(records)
}

/// Dispatch a single name outside a batch, reusing the same pipeline call.
pub async fn run_single(
    pipeline: &FailoverPipeline,
    name: &str,
    history: &mut RecentSearches,
) -> Result<LookupRecord, BatchError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BatchError::NoInput);
    }

    history.record(name);
    Ok(pipeline.resolve(name).await)
}
