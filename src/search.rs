// src/search.rs
// End-to-end search: description -> features -> ranked matches.

use log::error;
use std::sync::Arc;

use crate::catalog::DatasetCache;
use crate::error::SearchError;
use crate::extraction::FeatureExtractor;
use crate::matching::RankingEngine;
use crate::models::MatchResult;
use crate::utils::logging::SearchLogger;

pub struct SearchService {
    extractor: FeatureExtractor,
    ranking: RankingEngine,
}

impl SearchService {
    pub fn new(extractor: FeatureExtractor, ranking: RankingEngine) -> Self {
        Self { extractor, ranking }
    }

    pub fn cache(&self) -> &Arc<DatasetCache> {
        self.ranking.cache()
    }

    pub fn model_name(&self) -> &str {
        self.extractor.model_name()
    }

    /// Run one search. Only catalog unavailability surfaces as an error;
    /// extraction problems yield an empty result list.
    pub async fn search(&self, query: &str) -> Result<Vec<MatchResult>, SearchError> {
        let logger = SearchLogger::new();

        if query.trim().is_empty() {
            logger.log_phase("Skipped", Some("blank description"));
            return Ok(Vec::new());
        }
        logger.log_start(query);

        logger.log_phase("Feature extraction", Some(self.extractor.model_name()));
        let features = self.extractor.extract(query).await;
        logger.log_features(&features);

        logger.log_phase("Ranking", None);
        match self.ranking.rank(&features).await {
            Ok(results) => {
                logger.log_completed(&results);
                Ok(results)
            }
            Err(e) => {
                logger.log_failed(&e);
                Err(e)
            }
        }
    }

    /// [`search`](Self::search) on its own task, so a panic anywhere in the
    /// pipeline becomes [`SearchError::Internal`] instead of tearing down the
    /// caller.
    pub async fn search_guarded(self: Arc<Self>, query: String) -> Result<Vec<MatchResult>, SearchError> {
        match tokio::spawn(async move { self.search(&query).await }).await {
            Ok(outcome) => outcome,
            Err(join_error) => {
                error!("❌ Search task aborted: {}", join_error);
                Err(SearchError::Internal(join_error.to_string()))
            }
        }
    }
}
