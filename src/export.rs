//! Result set export: CSV, JSON, and the console summary.

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use csv::Writer;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::lookup::{Identifier, LookupRecord, ProviderKind};

const CSV_HEADERS: [&str; 5] = [
    "Input Legal Name",
    "Found Identifier",
    "Matched Legal Name",
    "Provider",
    "Manual Lookup Link",
];

pub fn export_csv(records: &[LookupRecord], output_path: &Path) -> Result<()> {
    debug!(
        "Exporting {} records to CSV: {}",
        records.len(),
        output_path.display()
    );

    let file = File::create(output_path)
        .with_context(|| format!("Failed to create output file: {}", output_path.display()))?;
    let mut wtr = Writer::from_writer(file);

    wtr.write_record(CSV_HEADERS)?;

    for record in records {
        wtr.write_record(&[
            record.input_name.clone(),
            record.identifier.label(),
            record.matched_name.clone().unwrap_or_default(),
            record
                .provider
                .map(|kind| kind.to_string())
                .unwrap_or_default(),
            record.manual_lookup_url(),
        ])?;
    }

    wtr.flush()?;
    info!(
        "Successfully exported {} records to CSV: {}",
        records.len(),
        output_path.display()
    );

    Ok(())
}

/// Read an exported CSV back into records. Inverse of [`export_csv`]; the
/// manual-link column is derived and therefore ignored on read.
pub fn read_csv(input_path: &Path) -> Result<Vec<LookupRecord>> {
    let file = File::open(input_path)
        .with_context(|| format!("Failed to open exported file: {}", input_path.display()))?;
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(file);

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.context("Failed to parse exported CSV row")?;

        let input_name = row
            .get(0)
            .ok_or_else(|| anyhow!("exported row is missing the input name column"))?
            .to_string();
        let identifier_label = row
            .get(1)
            .ok_or_else(|| anyhow!("exported row is missing the identifier column"))?;
        let identifier = Identifier::from_label(identifier_label).ok_or_else(|| {
            anyhow!("unrecognized identifier field in export: '{}'", identifier_label)
        })?;
        let matched_name = row
            .get(2)
            .map(str::to_string)
            .filter(|name| !name.is_empty());
        let provider = row
            .get(3)
            .filter(|value| !value.is_empty())
            .map(|value| {
                value
                    .parse::<ProviderKind>()
                    .map_err(|e| anyhow!("bad provider column in export: {}", e))
            })
            .transpose()?;

        records.push(LookupRecord {
            input_name,
            identifier,
            matched_name,
            provider,
        });
    }

    Ok(records)
}

#[derive(serde::Serialize)]
struct JsonExport<'a> {
    summary: ExportSummary,
    records: &'a [LookupRecord],
}

#[derive(serde::Serialize)]
struct ExportSummary {
    total_names: usize,
    found: usize,
    not_found: usize,
    errors: usize,
    generated_at: String,
}

impl ExportSummary {
    fn build(records: &[LookupRecord]) -> Self {
        Self {
            total_names: records.len(),
            found: records.iter().filter(|r| r.identifier.is_found()).count(),
            not_found: records
                .iter()
                .filter(|r| {
                    matches!(r.identifier, Identifier::NotFound | Identifier::NoTable)
                })
                .count(),
            errors: records
                .iter()
                .filter(|r| matches!(r.identifier, Identifier::Error(_)))
                .count(),
            generated_at: Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        }
    }
}

pub fn export_json(records: &[LookupRecord], output_path: &Path) -> Result<()> {
    debug!(
        "Exporting {} records to JSON: {}",
        records.len(),
        output_path.display()
    );

    let json_output = JsonExport {
        summary: ExportSummary::build(records),
        records,
    };

    let json_string = serde_json::to_string_pretty(&json_output)?;

    let mut file = File::create(output_path)
        .with_context(|| format!("Failed to create output file: {}", output_path.display()))?;
    file.write_all(json_string.as_bytes())?;

    info!(
        "Successfully exported {} records to JSON: {}",
        records.len(),
        output_path.display()
    );

    Ok(())
}

pub fn print_lookup_summary(records: &[LookupRecord]) {
    if records.is_empty() {
        println!("No lookups performed.");
        return;
    }

    let summary = ExportSummary::build(records);

    println!("\n=== Lookup Summary ===");
    println!("Names looked up:  {}", summary.total_names);
    println!("Identifiers found: {}", summary.found);
    println!("Not found:         {}", summary.not_found);
    println!("Errors:            {}", summary.errors);
    println!("======================\n");

    // List sentinel rows with their manual-lookup link for triage
    for record in records.iter().filter(|r| !r.identifier.is_found()) {
        println!(
            "  [{}] {} -> {}",
            record.identifier.label(),
            record.input_name,
            record.manual_lookup_url()
        );
    }
}
