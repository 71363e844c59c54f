//! Interactive portal provider.
//!
//! Drives a headless Chrome session against the public GSTIN search portal:
//! submit the name into the search field, wait a fixed settle delay, then
//! read the results table. The browser session is scoped to exactly one
//! lookup and is torn down on every exit path via the RAII guard.

use anyhow::{anyhow, Result};
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::debug;

use crate::browser;
use crate::config::{MatchStrictness, PortalConfig};
use crate::gstin::Gstin;
use crate::lookup::{Candidate, LookupOutcome};
use crate::provider::name_matches;

pub struct PortalProvider {
    config: PortalConfig,
    strictness: MatchStrictness,
}

impl PortalProvider {
    pub fn new(config: PortalConfig, strictness: MatchStrictness) -> Self {
        Self { config, strictness }
    }

    /// Resolve a name through the portal. One full browser session
    /// lifecycle per call; failures fold into the returned outcome.
    pub async fn lookup(&self, name: &str) -> LookupOutcome {
        let html = match self.fetch_results_page(name) {
            Ok(html) => html,
            Err(e) => return LookupOutcome::Error(e.to_string()),
        };

        scan_results_table(
            &html,
            name,
            &self.config.results_table_selector,
            self.strictness,
        )
    }

    /// Launch a browser, submit the query, and return the settled page HTML.
    /// The guard tears the Chrome process down when this function returns,
    /// on success and on failure alike.
    fn fetch_results_page(&self, name: &str) -> Result<String> {
        let guard = browser::create_browser()?;

        let tab = guard
            .browser
            .new_tab()
            .map_err(|e| anyhow!("Failed to create browser tab: {}", e))?;

        tab.navigate_to(&self.config.search_url)
            .map_err(|e| anyhow!("Failed to navigate to {}: {}", self.config.search_url, e))?;
        tab.wait_until_navigated()
            .map_err(|e| anyhow!("Portal page failed to load: {}", e))?;

        std::thread::sleep(Duration::from_millis(self.config.page_load_delay_ms));

        let search_box = tab
            .wait_for_element(&self.config.search_input_selector)
            .map_err(|e| {
                anyhow!(
                    "Search input '{}' not found on portal page: {}",
                    self.config.search_input_selector,
                    e
                )
            })?;
        search_box
            .click()
            .map_err(|e| anyhow!("Failed to focus search input: {}", e))?;
        tab.type_str(name)
            .map_err(|e| anyhow!("Failed to type query: {}", e))?;
        tab.press_key("Enter")
            .map_err(|e| anyhow!("Failed to submit query: {}", e))?;

        // Fixed settle delay: the portal renders results asynchronously
        std::thread::sleep(Duration::from_millis(self.config.settle_delay_ms));

        debug!("portal: reading settled page for '{}'", name);
        tab.get_content()
            .map_err(|e| anyhow!("Failed to read portal page content: {}", e))
    }
}

/// Read the results table out of the settled portal page.
///
/// Each data row is expected to carry the GSTIN in the first cell and the
/// legal name in the second. Rows whose legal name does not match the input
/// under the configured strictness are skipped, as are rows whose first
/// cell is not a well-formed GSTIN.
fn scan_results_table(
    html: &str,
    input_name: &str,
    table_selector: &str,
    strictness: MatchStrictness,
) -> LookupOutcome {
    let table_sel = match Selector::parse(table_selector) {
        Ok(sel) => sel,
        Err(e) => {
            return LookupOutcome::Error(format!(
                "invalid results table selector '{}': {}",
                table_selector, e
            ))
        }
    };
    // Static selectors: infallible to parse
    let row_sel = Selector::parse("tr").unwrap();
    let cell_sel = Selector::parse("td").unwrap();

    let document = Html::parse_document(html);
    let Some(table) = document.select(&table_sel).next() else {
        return LookupOutcome::NoTable;
    };

    let mut candidates = Vec::new();
    for row in table.select(&row_sel) {
        let cells: Vec<String> = row
            .select(&cell_sel)
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .collect();
        if cells.len() < 2 {
            // Header row or malformed row
            continue;
        }

        let Some(found) = Gstin::parse(&cells[0]) else {
            continue;
        };
        let legal_name = &cells[1];

        if name_matches(input_name, legal_name, strictness) {
            candidates.push(Candidate {
                gstin: found,
                legal_name: Some(legal_name.clone()),
            });
        }
    }

    if candidates.is_empty() {
        LookupOutcome::NotFound
    } else {
        LookupOutcome::Found(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE_SELECTOR: &str = "table.table";

    fn results_page(rows: &str) -> String {
        format!(
            r#"<html><body>
                <table class="table">
                    <tr><th>GSTIN</th><th>Legal Name</th></tr>
                    {}
                </table>
            </body></html>"#,
            rows
        )
    }

    #[test]
    fn test_scan_matching_row() {
        let html = results_page(
            "<tr><td>29ABCDE1234F1Z5</td><td>ACME INDUSTRIES PRIVATE LIMITED</td></tr>",
        );
        let outcome = scan_results_table(&html, "Acme", TABLE_SELECTOR, MatchStrictness::Substring);

        match outcome {
            LookupOutcome::Found(candidates) => {
                assert_eq!(candidates.len(), 1);
                assert_eq!(candidates[0].gstin.as_str(), "29ABCDE1234F1Z5");
                assert_eq!(
                    candidates[0].legal_name.as_deref(),
                    Some("ACME INDUSTRIES PRIVATE LIMITED")
                );
            }
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_returns_all_matching_rows() {
        let html = results_page(
            "<tr><td>29ABCDE1234F1Z5</td><td>ACME INDUSTRIES PRIVATE LIMITED</td></tr>\
             <tr><td>27PQRST5678G2Z9</td><td>ACME TRADING CO</td></tr>\
             <tr><td>24LMNOP9012H3Z1</td><td>ZENITH TRADERS</td></tr>",
        );
        let outcome = scan_results_table(&html, "acme", TABLE_SELECTOR, MatchStrictness::Substring);

        match outcome {
            LookupOutcome::Found(candidates) => {
                assert_eq!(candidates.len(), 2);
                assert_eq!(candidates[0].gstin.as_str(), "29ABCDE1234F1Z5");
                assert_eq!(candidates[1].gstin.as_str(), "27PQRST5678G2Z9");
            }
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_no_table_sentinel() {
        let html = "<html><body><p>Something went wrong</p></body></html>";
        assert_eq!(
            scan_results_table(html, "Acme", TABLE_SELECTOR, MatchStrictness::Substring),
            LookupOutcome::NoTable
        );
    }

    #[test]
    fn test_scan_no_matching_name() {
        let html = results_page("<tr><td>29ABCDE1234F1Z5</td><td>ZENITH TRADERS</td></tr>");
        assert_eq!(
            scan_results_table(&html, "Acme", TABLE_SELECTOR, MatchStrictness::Substring),
            LookupOutcome::NotFound
        );
    }

    #[test]
    fn test_scan_skips_invalid_identifier_cells() {
        let html = results_page(
            "<tr><td>pending</td><td>ACME INDUSTRIES</td></tr>\
             <tr><td>29ABCDE1234F1Z5</td><td>ACME INDUSTRIES</td></tr>",
        );
        let outcome = scan_results_table(&html, "Acme", TABLE_SELECTOR, MatchStrictness::Substring);

        match outcome {
            LookupOutcome::Found(candidates) => assert_eq!(candidates.len(), 1),
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_exact_strictness() {
        let html = results_page(
            "<tr><td>29ABCDE1234F1Z5</td><td>ACME INDUSTRIES PRIVATE LIMITED</td></tr>\
             <tr><td>27PQRST5678G2Z9</td><td>Acme Industries</td></tr>",
        );
        let outcome =
            scan_results_table(&html, "acme industries", TABLE_SELECTOR, MatchStrictness::Exact);

        match outcome {
            LookupOutcome::Found(candidates) => {
                assert_eq!(candidates.len(), 1);
                assert_eq!(candidates[0].gstin.as_str(), "27PQRST5678G2Z9");
            }
            other => panic!("expected Found, got {:?}", other),
        }
    }
}
