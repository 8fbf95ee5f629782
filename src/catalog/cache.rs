// src/catalog/cache.rs
use anyhow::{Context, Result};
use futures::future::join_all;
use indicatif::MultiProgress;
use log::{debug, error, info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};

use crate::catalog::client::{CatalogEntry, CatalogSource};
use crate::error::SearchError;
use crate::models::EntityRecord;
use crate::utils::config::{CatalogConfig, RetryPolicy};
use crate::utils::progress_config::catalog_progress_bar;

/// Populated catalog: lowercase name -> record, iterated in insertion order so
/// that ranking ties come out the same way on every run.
#[derive(Debug, Default)]
pub struct Catalog {
    entries: Vec<Arc<EntityRecord>>,
    by_name: HashMap<String, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert keyed by lowercased name. A repeated name replaces the earlier
    /// record in place; the catalog never shrinks.
    pub fn insert(&mut self, record: EntityRecord) {
        let key = record.key();
        let record = Arc::new(record);
        match self.by_name.get(&key) {
            Some(&idx) => self.entries[idx] = record,
            None => {
                self.by_name.insert(key, self.entries.len());
                self.entries.push(record);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<EntityRecord>> {
        self.by_name
            .get(&name.to_lowercase())
            .map(|&idx| &self.entries[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<EntityRecord>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<EntityRecord> for Catalog {
    fn from_iter<I: IntoIterator<Item = EntityRecord>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for record in iter {
            catalog.insert(record);
        }
        catalog
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    Empty,
    Populating,
    Ready,
    Failed,
}

enum CacheState {
    Empty,
    Populating,
    Ready(Arc<Catalog>),
    Failed(String),
}

/// Lazily populated, never invalidated dataset cache.
///
/// State only moves `Empty -> Populating -> Ready | Failed`. `init_lock`
/// serialises initialisation: concurrent callers queue behind the single
/// in-flight pass and then observe its outcome.
pub struct DatasetCache {
    source: Arc<dyn CatalogSource>,
    batch_size: usize,
    retry: RetryPolicy,
    multi_progress: Option<MultiProgress>,
    state: RwLock<CacheState>,
    init_lock: Mutex<()>,
}

impl DatasetCache {
    pub fn new(source: Arc<dyn CatalogSource>, config: &CatalogConfig) -> Self {
        Self {
            source,
            batch_size: config.batch_size.max(1),
            retry: config.retry.clone(),
            multi_progress: None,
            state: RwLock::new(CacheState::Empty),
            init_lock: Mutex::new(()),
        }
    }

    /// Show a progress bar while populating.
    pub fn with_progress(mut self, multi_progress: Option<MultiProgress>) -> Self {
        self.multi_progress = multi_progress;
        self
    }

    pub async fn status(&self) -> CacheStatus {
        match &*self.state.read().await {
            CacheState::Empty => CacheStatus::Empty,
            CacheState::Populating => CacheStatus::Populating,
            CacheState::Ready(_) => CacheStatus::Ready,
            CacheState::Failed(_) => CacheStatus::Failed,
        }
    }

    /// Number of cached records; zero until the cache is ready.
    pub async fn len(&self) -> usize {
        match &*self.state.read().await {
            CacheState::Ready(catalog) => catalog.len(),
            _ => 0,
        }
    }

    /// Populate the catalog on first use and return it.
    ///
    /// Runs at most one population pass per cache. A failed index fetch is
    /// remembered and returned to every later caller.
    pub async fn ensure_ready(&self) -> Result<Arc<Catalog>, SearchError> {
        if let Some(settled) = self.settled().await {
            return settled;
        }

        let _init_guard = self.init_lock.lock().await;
        if let Some(settled) = self.settled().await {
            return settled;
        }

        *self.state.write().await = CacheState::Populating;
        let start = Instant::now();

        match self.populate().await {
            Ok(catalog) => {
                let catalog = Arc::new(catalog);
                info!(
                    "✅ Catalog cache initialized with {} entries in {:.1}s",
                    catalog.len(),
                    start.elapsed().as_secs_f32()
                );
                *self.state.write().await = CacheState::Ready(catalog.clone());
                Ok(catalog)
            }
            Err(e) => {
                let message = format!("{:#}", e);
                error!("❌ Failed to initialize catalog cache: {}", message);
                *self.state.write().await = CacheState::Failed(message.clone());
                Err(SearchError::CatalogUnavailable(message))
            }
        }
    }

    async fn settled(&self) -> Option<Result<Arc<Catalog>, SearchError>> {
        match &*self.state.read().await {
            CacheState::Ready(catalog) => Some(Ok(catalog.clone())),
            CacheState::Failed(message) => {
                Some(Err(SearchError::CatalogUnavailable(message.clone())))
            }
            CacheState::Empty | CacheState::Populating => None,
        }
    }

    async fn populate(&self) -> Result<Catalog> {
        let index = self
            .source
            .fetch_index()
            .await
            .context("Failed to fetch catalog index")?;

        let total_batches = (index.len() + self.batch_size - 1) / self.batch_size;
        info!(
            "📚 Catalog index lists {} entities, fetching details in {} batches of {}",
            index.len(),
            total_batches,
            self.batch_size
        );

        let pb = self
            .multi_progress
            .as_ref()
            .map(|mp| catalog_progress_bar(mp, index.len() as u64));

        let mut catalog = Catalog::new();
        let mut dropped = 0usize;

        // Batches run one after another; only a batch's own fetches overlap.
        for (batch_idx, batch) in index.chunks(self.batch_size).enumerate() {
            let fetches = batch
                .iter()
                .map(|entry| fetch_with_retry(self.source.as_ref(), entry, &self.retry));
            let records = join_all(fetches).await;

            for record in records {
                match record {
                    Some(record) => catalog.insert(record),
                    None => dropped += 1,
                }
            }

            if let Some(pb) = &pb {
                pb.inc(batch.len() as u64);
                pb.set_message(format!("cache size: {}", catalog.len()));
            }
            debug!(
                "Processed batch {}/{} ({} entries), cache size: {}",
                batch_idx + 1,
                total_batches,
                batch.len(),
                catalog.len()
            );
        }

        if let Some(pb) = pb {
            pb.finish_with_message(format!("{} creatures cached", catalog.len()));
        }
        if dropped > 0 {
            warn!(
                "⚠️ {} of {} entities dropped after exhausting retries",
                dropped,
                index.len()
            );
        }

        Ok(catalog)
    }
}

/// Fetch one detail record, retrying per `retry`. `None` once every attempt
/// has failed.
async fn fetch_with_retry(
    source: &dyn CatalogSource,
    entry: &CatalogEntry,
    retry: &RetryPolicy,
) -> Option<EntityRecord> {
    let mut last_error = None;

    for attempt in 1..=retry.max_attempts {
        tokio::time::sleep(retry.jitter()).await;

        match source.fetch_detail(entry).await {
            Ok(record) => return Some(record),
            Err(e) => {
                debug!(
                    "Detail fetch for {} failed (attempt {}/{}): {:#}",
                    entry.name, attempt, retry.max_attempts, e
                );
                last_error = Some(e);
                if attempt < retry.max_attempts {
                    tokio::time::sleep(retry.backoff(attempt)).await;
                }
            }
        }
    }

    warn!(
        "Failed to fetch {} after {} attempts: {}",
        entry.name,
        retry.max_attempts,
        last_error
            .map(|e| format!("{:#}", e))
            .unwrap_or_else(|| "no attempts made".to_string())
    );
    None
}
