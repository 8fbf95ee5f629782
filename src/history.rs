// src/history.rs
// Local JSON store of past top results.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{EntityRecord, MatchResult};
use crate::utils::config::HistoryConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "pokemon")]
    pub entity: EntityRecord,
    #[serde(rename = "matchReason")]
    pub reason: String,
    pub confidence: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Newest-first history with one entry per entity id.
///
/// Entries older than the expiry horizon are dropped whenever the file is
/// read, and the file is rewritten when that happens.
pub struct SearchHistory {
    path: PathBuf,
    max_entries: usize,
    expiry: Duration,
}

impl SearchHistory {
    pub fn new(config: &HistoryConfig) -> Self {
        Self {
            path: config.path.clone(),
            max_entries: config.max_entries.max(1),
            // Out-of-range horizons mean nothing ever expires.
            expiry: Duration::try_days(config.expiry_days).unwrap_or(Duration::MAX),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Vec<HistoryEntry>> {
        self.load_at(Utc::now())
    }

    pub fn load_at(&self, now: DateTime<Utc>) -> Result<Vec<HistoryEntry>> {
        let entries = self.read_raw();
        let horizon = now.checked_sub_signed(self.expiry);
        let total = entries.len();

        let kept: Vec<HistoryEntry> = entries
            .into_iter()
            .filter(|entry| horizon.map_or(true, |horizon| entry.recorded_at > horizon))
            .collect();

        if kept.len() != total {
            info!(
                "🧹 Pruned {} expired history entries from {}",
                total - kept.len(),
                self.path.display()
            );
            self.write(&kept)?;
        }
        Ok(kept)
    }

    pub fn record(&self, result: &MatchResult) -> Result<()> {
        self.record_at(result, Utc::now())
    }

    /// Store `result` at the front, replacing any older entry for the same id.
    pub fn record_at(&self, result: &MatchResult, now: DateTime<Utc>) -> Result<()> {
        let mut entries = self.load_at(now)?;
        entries.retain(|entry| entry.entity.id != result.entity.id);
        entries.insert(
            0,
            HistoryEntry {
                entity: (*result.entity).clone(),
                reason: result.reason.clone(),
                confidence: result.confidence,
                recorded_at: now,
            },
        );
        entries.truncate(self.max_entries);
        debug!(
            "Recorded {} in history ({} entries)",
            result.entity.name,
            entries.len()
        );
        self.write(&entries)
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        }
        Ok(())
    }

    fn read_raw(&self) -> Vec<HistoryEntry> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str(&contents) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    "⚠️  History file {} is unreadable, starting fresh: {}",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    fn write(&self, entries: &[HistoryEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(entries).context("Failed to serialize history")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write history to {}", self.path.display()))
    }
}
