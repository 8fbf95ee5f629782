// src/error.rs
use thiserror::Error;

/// Failures surfaced to search callers. Detail-fetch and extraction failures
/// never show up here; they only reduce result quality.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// The catalog index could not be fetched, so the cache never became ready.
    #[error("catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// Anything unexpected while ranking, including a panicked search task.
    #[error("search failed: {0}")]
    Internal(String),
}

impl SearchError {
    /// Message shown to end users; internal details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            SearchError::CatalogUnavailable(_) => {
                "Search failed: the creature catalog could not be loaded".to_string()
            }
            SearchError::Internal(_) => "Search failed: an unexpected error occurred".to_string(),
        }
    }
}
