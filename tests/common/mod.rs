// tests/common/mod.rs
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use search_lib::catalog::{CatalogEntry, CatalogSource, DatasetCache};
use search_lib::extraction::{FeatureExtractor, GenerativeModel};
use search_lib::matching::RankingEngine;
use search_lib::models::EntityRecord;
use search_lib::search::SearchService;
use search_lib::utils::config::{CatalogConfig, RetryPolicy};

/// In-memory catalog with a switchable index failure.
pub struct FakeCatalog {
    pub records: Vec<EntityRecord>,
    pub fail_index: bool,
    pub index_calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn new(records: Vec<EntityRecord>) -> Self {
        Self {
            records,
            fail_index: false,
            index_calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            fail_index: true,
            ..Self::new(Vec::new())
        }
    }
}

#[async_trait]
impl CatalogSource for FakeCatalog {
    async fn fetch_index(&self) -> Result<Vec<CatalogEntry>> {
        self.index_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_index {
            return Err(anyhow!("catalog host unreachable"));
        }
        Ok(self
            .records
            .iter()
            .map(|r| CatalogEntry {
                name: r.name.clone(),
                url: format!("pokemon/{}/", r.id),
            })
            .collect())
    }

    async fn fetch_detail(&self, entry: &CatalogEntry) -> Result<EntityRecord> {
        self.records
            .iter()
            .find(|r| r.name == entry.name)
            .cloned()
            .ok_or_else(|| anyhow!("no detail for {}", entry.name))
    }
}

/// How a [`FakeModel`] answers.
pub enum Reply {
    Text(String),
    Fail,
    Panic,
}

pub struct FakeModel {
    reply: Reply,
    pub calls: AtomicUsize,
}

impl FakeModel {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn text(reply: &str) -> Self {
        Self::new(Reply::Text(reply.to_string()))
    }
}

#[async_trait]
impl GenerativeModel for FakeModel {
    fn name(&self) -> &str {
        "fake"
    }

    async fn generate(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Fail => Err(anyhow!("model quota exhausted")),
            Reply::Panic => panic!("model adapter blew up"),
        }
    }
}

pub fn sample_records() -> Vec<EntityRecord> {
    vec![
        EntityRecord::new(25, "pikachu", &["electric"], &["static", "lightning-rod"]),
        EntityRecord::new(26, "raichu", &["electric"], &["static", "lightning-rod"]),
        EntityRecord::new(4, "charmander", &["fire"], &["blaze", "solar-power"]),
        EntityRecord::new(6, "charizard", &["fire", "flying"], &["blaze", "solar-power"]),
        EntityRecord::new(7, "squirtle", &["water"], &["torrent", "rain-dish"]),
    ]
}

pub fn test_catalog_config() -> CatalogConfig {
    CatalogConfig {
        batch_size: 2,
        retry: RetryPolicy::immediate(3),
        ..CatalogConfig::default()
    }
}

pub fn build_service(catalog: Arc<FakeCatalog>, model: Arc<FakeModel>) -> Arc<SearchService> {
    let cache = Arc::new(DatasetCache::new(catalog, &test_catalog_config()));
    Arc::new(SearchService::new(
        FeatureExtractor::new(model),
        RankingEngine::new(cache),
    ))
}
