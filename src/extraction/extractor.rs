// src/extraction/extractor.rs
use anyhow::{anyhow, Context, Result};
use log::{debug, warn};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::extraction::model::GenerativeModel;
use crate::extraction::repair::repair_json;
use crate::models::FeatureBag;

/// Longest description prefix sent to the model, in characters.
pub const MAX_QUERY_CHARS: usize = 999;

const PROMPT_TEMPLATE: &str = r#"You are a Pokémon expert. Read the description below and work out which Pokémon it most plausibly refers to.

Description:
{description}

The description may name a Pokémon directly, describe its looks or behaviour, or recall a scene from the games, anime, movies or other media. Consider every Pokémon, including Legendary and Mythical Pokémon, Ultra Beasts, regional forms and the newest generation.

Reply with a single JSON object and nothing else, using exactly these fields:
- "name": an object with "en" (the English name of a real Pokémon) and "zh" (its Traditional Chinese name).
- "types": array of plausible elemental types, such as "Fire", "Dragon", "Psychic" or "Fairy".
- "characteristics": array of physical and personality traits, such as body shape, colours or behaviour.
- "abilities": array of plausible abilities, including signature moves and hidden abilities.

Only the "zh" name may be written in Chinese; every other value must be in English."#;

/// Fill the fixed instruction template with the (already truncated) description.
pub fn build_prompt(description: &str) -> String {
    PROMPT_TEMPLATE.replace("{description}", description)
}

/// First `max_chars` characters of `text`, never splitting a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Turns free text into a [`FeatureBag`] through a generative model.
pub struct FeatureExtractor {
    model: Arc<dyn GenerativeModel>,
}

impl FeatureExtractor {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Never fails: model or parse problems degrade to an empty bag.
    pub async fn extract(&self, text: &str) -> FeatureBag {
        let prompt = build_prompt(truncate_chars(text, MAX_QUERY_CHARS));

        let reply = match self.model.generate(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    "🤖 Model call to {} failed, continuing with no features: {:#}",
                    self.model.name(),
                    e
                );
                return FeatureBag::default();
            }
        };
        debug!("Raw model reply: {}", reply.trim());

        match parse_feature_reply(&reply) {
            Ok(features) => features,
            Err(e) => {
                warn!("🤖 Could not parse model reply, continuing with no features: {:#}", e);
                FeatureBag::default()
            }
        }
    }
}

/// Repair and parse a model reply into features.
///
/// A `matches` list (or a top-level array) contributes only its first
/// element; otherwise the top-level fields are read directly.
pub fn parse_feature_reply(reply: &str) -> Result<FeatureBag> {
    let repaired = repair_json(reply);
    let value: Value = serde_json::from_str(&repaired)
        .with_context(|| format!("Model reply is not valid JSON after repair: {}", repaired))?;

    let payload = select_payload(&value).ok_or_else(|| anyhow!("Model reply holds no analysis object"))?;

    Ok(FeatureBag::new(
        candidate_names(payload.get("name")),
        string_list(payload.get("types")),
        string_list(payload.get("abilities")),
        string_list(payload.get("characteristics")),
    ))
}

fn select_payload(value: &Value) -> Option<&Map<String, Value>> {
    match value {
        Value::Object(map) => match map.get("matches") {
            Some(Value::Array(matches)) => matches.first().and_then(select_payload),
            _ => Some(map),
        },
        Value::Array(items) => items.first().and_then(select_payload),
        _ => None,
    }
}

/// `name` may be `{"en": "..."}`, `{"en": ["...", "..."]}`, a bare string, or
/// a list of either.
fn candidate_names(name: Option<&Value>) -> Vec<String> {
    match name {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Object(map)) => match map.get("en") {
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        },
        Some(Value::Array(items)) => items
            .iter()
            .flat_map(|item| candidate_names(Some(item)))
            .collect(),
        _ => Vec::new(),
    }
}

/// Arrays of strings (or of `{"name": ..}` objects); a lone string is split
/// on commas.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Object(map) => map.get("name").and_then(Value::as_str).map(str::to_string),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    }
}
