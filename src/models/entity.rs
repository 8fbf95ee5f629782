// src/models/entity.rs
use serde::{Deserialize, Serialize};

/// One base stat of a creature, e.g. `hp` or `speed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStat {
    pub name: String,
    pub value: u32,
}

/// A cached creature record. Only `types` and `abilities` take part in scoring;
/// the remaining fields are carried for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: u32,
    pub name: String,
    pub types: Vec<String>,
    pub abilities: Vec<String>,
    #[serde(default)]
    pub sprite_url: Option<String>,
    #[serde(default)]
    pub artwork_url: Option<String>,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub stats: Vec<BaseStat>,
}

impl EntityRecord {
    /// Record with scoring attributes only; display attributes left empty.
    pub fn new(id: u32, name: &str, types: &[&str], abilities: &[&str]) -> Self {
        Self {
            id,
            name: name.to_string(),
            types: types.iter().map(|t| t.to_string()).collect(),
            abilities: abilities.iter().map(|a| a.to_string()).collect(),
            sprite_url: None,
            artwork_url: None,
            height: 0,
            weight: 0,
            stats: Vec::new(),
        }
    }

    /// Cache key: the lowercased name.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }
}
