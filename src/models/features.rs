// src/models/features.rs
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Structured features pulled out of a free-text description.
///
/// Each list behaves like an ordered set: blank entries are dropped and
/// case-insensitive duplicates collapse onto their first occurrence.
/// `characteristics` is kept for display and is not scored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureBag {
    pub candidate_names: Vec<String>,
    pub types: Vec<String>,
    pub abilities: Vec<String>,
    pub characteristics: Vec<String>,
}

impl FeatureBag {
    pub fn new(
        candidate_names: Vec<String>,
        types: Vec<String>,
        abilities: Vec<String>,
        characteristics: Vec<String>,
    ) -> Self {
        Self {
            candidate_names: normalize_tags(candidate_names),
            types: normalize_tags(types),
            abilities: normalize_tags(abilities),
            characteristics: normalize_tags(characteristics),
        }
    }

    pub fn has_candidates(&self) -> bool {
        !self.candidate_names.is_empty()
    }

    /// True when there is at least one type or ability tag to score against.
    pub fn has_scoring_features(&self) -> bool {
        !self.types.is_empty() || !self.abilities.is_empty()
    }

    /// Nothing usable for ranking: no names, no types, no abilities.
    pub fn is_empty(&self) -> bool {
        !self.has_candidates() && !self.has_scoring_features()
    }
}

fn normalize_tags(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .filter(|v| seen.insert(v.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_new_drops_blanks_and_case_duplicates() {
        let bag = FeatureBag::new(
            strings(&["Pikachu", " ", "pikachu"]),
            strings(&["Electric", "electric ", ""]),
            strings(&["Static", "Lightning Rod"]),
            strings(&["yellow", "Yellow"]),
        );

        assert_eq!(bag.candidate_names, vec!["Pikachu"]);
        assert_eq!(bag.types, vec!["Electric"]);
        assert_eq!(bag.abilities, vec!["Static", "Lightning Rod"]);
        assert_eq!(bag.characteristics, vec!["yellow"]);
    }

    #[test]
    fn test_emptiness_ignores_characteristics() {
        let bag = FeatureBag::new(vec![], vec![], vec![], strings(&["small", "round"]));
        assert!(bag.is_empty());
        assert!(!bag.has_scoring_features());

        let typed = FeatureBag::new(vec![], strings(&["fire"]), vec![], vec![]);
        assert!(!typed.is_empty());
        assert!(typed.has_scoring_features());
        assert!(!typed.has_candidates());
    }
}
