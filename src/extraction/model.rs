// src/extraction/model.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

use crate::extraction::gemini::GeminiClient;
use crate::extraction::ollama::OllamaClient;
use crate::utils::config::{ModelConfig, ModelProvider};

/// Single-shot text-in / text-out generative model.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Short label for logs.
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Build the model client selected by `LLM_PROVIDER`.
pub fn build_model(config: &ModelConfig) -> Result<Arc<dyn GenerativeModel>> {
    let model: Arc<dyn GenerativeModel> = match config.provider {
        ModelProvider::Gemini => {
            Arc::new(GeminiClient::new(config).context("Failed to set up Gemini client")?)
        }
        ModelProvider::Ollama => {
            Arc::new(OllamaClient::new(config).context("Failed to set up Ollama client")?)
        }
    };
    Ok(model)
}
