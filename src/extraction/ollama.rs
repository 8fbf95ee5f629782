// src/extraction/ollama.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::extraction::model::GenerativeModel;
use crate::utils::config::ModelConfig;

/// OLLAMA API request structure
#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    format: &'static str,
    stream: bool,
    options: OllamaOptions,
}

/// OLLAMA options for better control
#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    top_p: f32,
    repeat_penalty: f32,
}

/// OLLAMA API response structure
#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

/// Local model served by OLLAMA's `/api/generate`.
pub struct OllamaClient {
    http: Client,
    url: String,
    model: String,
    label: String,
    temperature: f32,
}

impl OllamaClient {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build OLLAMA HTTP client")?;

        Ok(Self {
            http,
            url: config.ollama_url.trim_end_matches('/').to_string(),
            model: config.ollama_model.clone(),
            label: format!("ollama:{}", config.ollama_model),
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl GenerativeModel for OllamaClient {
    fn name(&self) -> &str {
        &self.label
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = OllamaRequest {
            model: &self.model,
            prompt,
            format: "json",
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
                top_p: 0.9,
                repeat_penalty: 1.1,
            },
        };

        let response = self
            .http
            .post(format!("{}/api/generate", self.url))
            .json(&request)
            .send()
            .await
            .context("Failed to send request to OLLAMA")?;

        if !response.status().is_success() {
            return Err(anyhow!("OLLAMA returned status: {}", response.status()));
        }

        let ollama_response: OllamaResponse = response
            .json()
            .await
            .context("Failed to parse OLLAMA response")?;
        Ok(ollama_response.response)
    }
}
