// src/catalog/profile.rs
//! Single-entity profile lookup: the detail record plus localized display
//! names from the species endpoint. Independent of the dataset cache.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::client::{NamedResource, PokeApiClient};
use crate::models::EntityRecord;

/// Languages pulled from the species record, besides English.
pub const LOCALIZED_LANGUAGES: [&str; 3] = ["zh-Hant", "zh-Hans", "ja"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityProfile {
    #[serde(flatten)]
    pub record: EntityRecord,
    /// Language code -> display name. `en` is always present.
    pub localized_names: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct LocalizedName {
    name: String,
    language: NamedResource,
}

#[derive(Deserialize)]
struct SpeciesDetail {
    #[serde(default)]
    names: Vec<LocalizedName>,
}

fn localized_names(record: &EntityRecord, species: SpeciesDetail) -> BTreeMap<String, String> {
    let mut names = BTreeMap::new();
    names.insert("en".to_string(), record.name.clone());
    for entry in species.names {
        if LOCALIZED_LANGUAGES.contains(&entry.language.name.as_str()) {
            names.entry(entry.language.name).or_insert(entry.name);
        }
    }
    names
}

impl PokeApiClient {
    /// Fetch the detail and species records for `id` concurrently.
    pub async fn fetch_profile(&self, id: u32) -> Result<EntityProfile> {
        let species_url = self.endpoint(&format!("pokemon-species/{}", id))?;

        let (record, species) = tokio::try_join!(
            self.fetch_record(id),
            self.get_json::<SpeciesDetail>(species_url)
        )
        .with_context(|| format!("Failed to fetch profile for entity {}", id))?;

        let localized_names = localized_names(&record, species);
        Ok(EntityProfile {
            record,
            localized_names,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_localized_names_keep_supported_languages() {
        let record = EntityRecord::new(25, "pikachu", &["electric"], &["static"]);
        let species: SpeciesDetail = serde_json::from_value(serde_json::json!({
            "names": [
                {"name": "ピカチュウ", "language": {"name": "ja-Hrkt"}},
                {"name": "皮卡丘", "language": {"name": "zh-Hant"}},
                {"name": "Pikachu", "language": {"name": "fr"}},
                {"name": "皮卡丘", "language": {"name": "zh-Hans"}},
                {"name": "ピカチュウ", "language": {"name": "ja"}}
            ]
        }))
        .unwrap();

        let names = localized_names(&record, species);
        assert_eq!(names.len(), 4);
        assert_eq!(names["en"], "pikachu");
        assert_eq!(names["zh-Hant"], "皮卡丘");
        assert_eq!(names["ja"], "ピカチュウ");
        assert!(!names.contains_key("fr"));
    }

    #[test]
    fn test_localized_names_without_species_names() {
        let record = EntityRecord::new(10001, "deoxys-attack", &["psychic"], &["pressure"]);
        let species: SpeciesDetail = serde_json::from_value(serde_json::json!({})).unwrap();
        let names = localized_names(&record, species);
        assert_eq!(names.len(), 1);
        assert_eq!(names["en"], "deoxys-attack");
    }
}
