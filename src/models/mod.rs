// src/models/mod.rs
pub mod entity;
pub mod features;
pub mod matching;

pub use entity::{BaseStat, EntityRecord};
pub use features::FeatureBag;
pub use matching::{MatchResult, SearchRequest, SearchResponse};
