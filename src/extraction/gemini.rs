// src/extraction/gemini.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::extraction::model::GenerativeModel;
use crate::utils::config::ModelConfig;

/// The key travels in a header so it never shows up in request URLs or errors.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini `generateContent` request body
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

/// Gemini `generateContent` response, reduced to the text parts
#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

pub struct GeminiClient {
    http: Client,
    endpoint: Url,
    api_key: String,
    label: String,
    temperature: f32,
}

impl GeminiClient {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let api_key = config
            .gemini_api_key
            .clone()
            .ok_or_else(|| anyhow!("GEMINI_API_KEY is not set"))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build Gemini HTTP client")?;

        let mut base = config.gemini_base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let endpoint = Url::parse(&base)
            .and_then(|base| base.join(&format!("models/{}:generateContent", config.gemini_model)))
            .with_context(|| format!("Invalid Gemini base URL: {}", config.gemini_base_url))?;

        Ok(Self {
            http,
            endpoint,
            api_key,
            label: format!("gemini:{}", config.gemini_model),
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    fn name(&self) -> &str {
        &self.label
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let response = self
            .http
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&request)
            .send()
            .await
            .map_err(|e| e.without_url())
            .context("Failed to send request to Gemini")?;

        if !response.status().is_success() {
            return Err(anyhow!("Gemini returned status: {}", response.status()));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .context("Failed to parse Gemini response")?;

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(anyhow!("Gemini returned no text candidates"));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> ModelConfig {
        ModelConfig {
            gemini_api_key: Some("test-key".to_string()),
            gemini_model: "gemini-test".to_string(),
            gemini_base_url: format!("{}/v1beta", server.uri()),
            ..ModelConfig::default()
        }
    }

    #[tokio::test]
    async fn test_generate_joins_text_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-test:generateContent"))
            .and(header(API_KEY_HEADER, "test-key"))
            .and(query_param_is_missing("key"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{"parts": [{"text": "describe"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {"parts": [{"text": "{\"types\": "}, {"text": "[\"fire\"]}"}]}
                }]
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new(&config_for(&server)).unwrap();
        let text = client.generate("describe").await.unwrap();
        assert_eq!(text, "{\"types\": [\"fire\"]}");
    }

    #[tokio::test]
    async fn test_generate_surfaces_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = GeminiClient::new(&config_for(&server)).unwrap();
        assert!(client.generate("describe").await.is_err());
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::new(&config_for(&server)).unwrap();
        assert!(client.generate("describe").await.is_err());
    }

    #[tokio::test]
    async fn test_send_failure_does_not_leak_api_key() {
        let config = ModelConfig {
            gemini_api_key: Some("SECRET-KEY-123".to_string()),
            gemini_base_url: "http://127.0.0.1:9/v1beta".to_string(),
            timeout_secs: 5,
            ..ModelConfig::default()
        };
        let client = GeminiClient::new(&config).unwrap();

        let err = client.generate("describe").await.unwrap_err();
        let logged = format!("{:#}", err);
        assert!(logged.contains("Failed to send request to Gemini"));
        assert!(!logged.contains("SECRET-KEY-123"));
    }
}
