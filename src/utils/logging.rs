// src/utils/logging.rs - Logging helpers for a single search run
use log::{debug, info, warn};
use std::time::Instant;
use uuid::Uuid;

use crate::error::SearchError;
use crate::models::{FeatureBag, MatchResult};

/// Tags every log line of one search with a short run id and elapsed time.
#[derive(Clone)]
pub struct SearchLogger {
    run_id: String,
    start_time: Instant,
}

impl SearchLogger {
    pub fn new() -> Self {
        let run_id = Uuid::new_v4().simple().to_string();
        Self {
            run_id: run_id[..8].to_string(),
            start_time: Instant::now(),
        }
    }

    pub fn log_start(&self, query: &str) {
        info!(
            "[SEARCH {}] 🔎 Starting search ({} chars of description)",
            self.run_id,
            query.chars().count()
        );
    }

    pub fn log_phase(&self, phase: &str, details: Option<&str>) {
        let elapsed = self.start_time.elapsed();
        match details {
            Some(details) => info!(
                "[SEARCH {}] 🔄 Phase: {} - {} [+{:.1}s]",
                self.run_id,
                phase,
                details,
                elapsed.as_secs_f32()
            ),
            None => info!(
                "[SEARCH {}] 🔄 Phase: {} [+{:.1}s]",
                self.run_id,
                phase,
                elapsed.as_secs_f32()
            ),
        }
    }

    pub fn log_features(&self, features: &FeatureBag) {
        if features.is_empty() {
            warn!(
                "[SEARCH {}] ⚠️  No usable features extracted, result set will be empty",
                self.run_id
            );
            return;
        }
        info!(
            "[SEARCH {}] 🧩 Features: names={:?} types={:?} abilities={:?}",
            self.run_id, features.candidate_names, features.types, features.abilities
        );
        debug!(
            "[SEARCH {}] Characteristics (not scored): {:?}",
            self.run_id, features.characteristics
        );
    }

    pub fn log_completed(&self, results: &[MatchResult]) {
        let elapsed = self.start_time.elapsed();
        match results.first() {
            Some(top) => info!(
                "[SEARCH {}] ✅ {} matches, top: {} ({:.2}) in {:.2}s",
                self.run_id,
                results.len(),
                top.entity.name,
                top.confidence,
                elapsed.as_secs_f64()
            ),
            None => info!(
                "[SEARCH {}] ✅ No matches in {:.2}s",
                self.run_id,
                elapsed.as_secs_f64()
            ),
        }
    }

    pub fn log_failed(&self, error: &SearchError) {
        warn!(
            "[SEARCH {}] ❌ Search failed after {:.2}s: {}",
            self.run_id,
            self.start_time.elapsed().as_secs_f64(),
            error
        );
    }
}

impl Default for SearchLogger {
    fn default() -> Self {
        Self::new()
    }
}
