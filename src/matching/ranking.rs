// src/matching/ranking.rs
// Exact-name and attribute-similarity ranking over the cached catalog.

use log::debug;
use std::collections::HashSet;
use std::sync::Arc;

use crate::catalog::{Catalog, DatasetCache};
use crate::error::SearchError;
use crate::matching::scorer::{reason, score};
use crate::models::{FeatureBag, MatchResult};

/// Added to the attribute score of an entity named by the model. Not clamped,
/// so exact hits can exceed 1.0 and sort above every similarity hit.
pub const EXACT_NAME_BONUS: f64 = 0.5;

pub struct RankingEngine {
    cache: Arc<DatasetCache>,
}

impl RankingEngine {
    pub fn new(cache: Arc<DatasetCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<DatasetCache> {
        &self.cache
    }

    /// Rank the catalog against `features`, populating the cache on first use.
    pub async fn rank(&self, features: &FeatureBag) -> Result<Vec<MatchResult>, SearchError> {
        let catalog = self.cache.ensure_ready().await?;
        Ok(rank_catalog(&catalog, features))
    }
}

/// Ranking over an already populated catalog.
///
/// With candidate names, exact hits (score plus [`EXACT_NAME_BONUS`]) are
/// merged with positive-scoring similarity hits among the other entities,
/// keeping one entry per entity id. Without names, only positive attribute
/// scores are returned. The result is stably sorted by descending confidence.
pub fn rank_catalog(catalog: &Catalog, features: &FeatureBag) -> Vec<MatchResult> {
    let mut results = if features.has_candidates() {
        merge_exact_and_similar(catalog, features)
    } else if features.has_scoring_features() {
        similar_matches(catalog, features, &HashSet::new())
    } else {
        Vec::new()
    };

    results.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    results
}

fn merge_exact_and_similar(catalog: &Catalog, features: &FeatureBag) -> Vec<MatchResult> {
    let candidate_keys: HashSet<String> = features
        .candidate_names
        .iter()
        .map(|name| name.to_lowercase())
        .collect();

    let mut exact = Vec::new();
    for name in &features.candidate_names {
        match catalog.get(name) {
            Some(entity) => exact.push(MatchResult {
                entity: entity.clone(),
                reason: reason(entity),
                confidence: score(entity, features) + EXACT_NAME_BONUS,
            }),
            None => debug!("Candidate name '{}' is not in the catalog", name),
        }
    }

    let similar = similar_matches(catalog, features, &candidate_keys);

    let mut seen_ids = HashSet::new();
    exact
        .into_iter()
        .chain(similar)
        .filter(|result| seen_ids.insert(result.entity.id))
        .collect()
}

fn similar_matches(
    catalog: &Catalog,
    features: &FeatureBag,
    excluded_keys: &HashSet<String>,
) -> Vec<MatchResult> {
    catalog
        .iter()
        .filter(|entity| !excluded_keys.contains(&entity.key()))
        .filter_map(|entity| {
            let confidence = score(entity, features);
            (confidence > 0.0).then(|| MatchResult {
                entity: entity.clone(),
                reason: reason(entity),
                confidence,
            })
        })
        .collect()
}
