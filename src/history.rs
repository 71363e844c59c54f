//! Bounded recent-search history.
//!
//! The batch driver records each dispatched name; duplicates are collapsed
//! by exact string match with recency promoted, and the oldest entry is
//! evicted once the cap is exceeded. Optionally persisted between runs as
//! JSON under the user data directory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Maximum number of names retained.
pub const MAX_RECENT: usize = 5;

/// Ordered recent-search names, stored oldest first. Use
/// [`RecentSearches::most_recent_first`] for display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecentSearches {
    entries: VecDeque<String>,
}

impl RecentSearches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a dispatched name. An exact duplicate is removed from its old
    /// position and re-added as the most recent entry; beyond the cap, the
    /// oldest entry is evicted.
    pub fn record(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }

        if let Some(pos) = self.entries.iter().position(|entry| entry == name) {
            self.entries.remove(pos);
        }
        self.entries.push_back(name.to_string());

        while self.entries.len() > MAX_RECENT {
            self.entries.pop_front();
        }
    }

    /// Stored order, oldest first.
    pub fn as_slice(&self) -> Vec<&str> {
        self.entries.iter().map(String::as_str).collect()
    }

    /// Display order, most recent first.
    pub fn most_recent_first(&self) -> Vec<String> {
        self.entries.iter().rev().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load history from disk. Missing or unreadable files degrade to an
    /// empty history rather than failing the run.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(history) => history,
                Err(e) => {
                    warn!("Ignoring malformed history file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                debug!("No history file at {}, starting empty", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create history directory: {}", parent.display())
            })?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize history")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write history file: {}", path.display()))?;
        Ok(())
    }
}

/// Default on-disk location for the history file.
pub fn default_history_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("gstfinder").join("recent_searches.json"))
}
