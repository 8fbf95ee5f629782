pub mod ranking;
pub mod scorer;

pub use ranking::{rank_catalog, RankingEngine, EXACT_NAME_BONUS};
pub use scorer::{reason, score};
