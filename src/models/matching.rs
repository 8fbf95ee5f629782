// src/models/matching.rs
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::entity::EntityRecord;

/// One ranked hit. `entity` points into the cache; results never own a copy.
///
/// Field names on the wire follow the search page contract
/// (`pokemon`, `matchReason`, `confidence`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "pokemon")]
    pub entity: Arc<EntityRecord>,
    #[serde(rename = "matchReason")]
    pub reason: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchResponse {
    pub results: Vec<MatchResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResponse {
    pub fn ok(results: Vec<MatchResult>) -> Self {
        Self {
            results,
            error: None,
        }
    }

    pub fn failed(message: String) -> Self {
        Self {
            results: Vec::new(),
            error: Some(message),
        }
    }
}
