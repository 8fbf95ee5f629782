// src/matching/scorer.rs
// Attribute-overlap scoring of a cached entity against extracted features.

use crate::models::{EntityRecord, FeatureBag};

pub const TYPE_MATCH_WEIGHT: f64 = 0.3;
pub const ABILITY_MATCH_WEIGHT: f64 = 0.2;
pub const MAX_SCORE: f64 = 1.0;

/// Similarity in `[0, 1]`.
///
/// Every feature type equal (case-insensitively) to one of the entity's types
/// adds [`TYPE_MATCH_WEIGHT`]; every feature ability contained in one of the
/// entity's abilities adds [`ABILITY_MATCH_WEIGHT`].
pub fn score(entity: &EntityRecord, features: &FeatureBag) -> f64 {
    let entity_types: Vec<String> = entity.types.iter().map(|t| t.to_lowercase()).collect();
    let entity_abilities: Vec<String> = entity.abilities.iter().map(|a| a.to_lowercase()).collect();

    let type_hits = features
        .types
        .iter()
        .map(|t| t.to_lowercase())
        .filter(|t| entity_types.iter().any(|et| et == t))
        .count();

    let ability_hits = features
        .abilities
        .iter()
        .map(|a| a.to_lowercase())
        .filter(|a| entity_abilities.iter().any(|ea| ea.contains(a.as_str())))
        .count();

    let raw = type_hits as f64 * TYPE_MATCH_WEIGHT + ability_hits as f64 * ABILITY_MATCH_WEIGHT;
    raw.min(MAX_SCORE)
}

/// Human-readable summary of the entity's scoring attributes. Depends only on
/// the entity, so every hit on the same entity reads the same.
pub fn reason(entity: &EntityRecord) -> String {
    let types = if entity.types.is_empty() {
        "unknown".to_string()
    } else {
        entity.types.join("/")
    };
    let abilities = if entity.abilities.is_empty() {
        "none".to_string()
    } else {
        entity.abilities.join(", ")
    };
    format!("Type: {}; abilities: {}", types, abilities)
}
