// src/extraction/mod.rs
pub mod extractor;
pub mod gemini;
pub mod model;
pub mod ollama;
pub mod repair;

pub use extractor::FeatureExtractor;
pub use model::{build_model, GenerativeModel};
