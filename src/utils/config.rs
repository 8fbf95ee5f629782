// src/utils/config.rs
//! Environment-driven configuration for the catalog, the model provider,
//! the HTTP server and the local search history.

use log::{info, warn};
use rand::Rng;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::utils::env::{env_parse, env_string};

pub const DEFAULT_POKEAPI_BASE_URL: &str = "https://pokeapi.co/api/v2";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-pro-exp-02-05";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.1";

/// Per-entity detail fetch cadence: a random pause before every attempt and a
/// linearly growing pause after each failed attempt except the last.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub jitter_min_ms: u64,
    pub jitter_max_ms: u64,
    pub backoff_base_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            jitter_min_ms: 50,
            jitter_max_ms: 80,
            backoff_base_ms: 1000,
        }
    }
}

impl RetryPolicy {
    /// No waiting at all; used by tests and offline tooling.
    pub fn immediate(max_attempts: usize) -> Self {
        Self {
            max_attempts,
            jitter_min_ms: 0,
            jitter_max_ms: 0,
            backoff_base_ms: 0,
        }
    }

    pub fn jitter(&self) -> Duration {
        let upper = self.jitter_max_ms.max(self.jitter_min_ms);
        let millis = rand::thread_rng().gen_range(self.jitter_min_ms..=upper);
        Duration::from_millis(millis)
    }

    /// Pause after the given failed attempt (1-based).
    pub fn backoff(&self, attempt: usize) -> Duration {
        Duration::from_millis(self.backoff_base_ms.saturating_mul(attempt as u64))
    }
}

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub base_url: String,
    pub index_limit: u32,
    pub batch_size: usize,
    pub request_timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_POKEAPI_BASE_URL.to_string(),
            index_limit: 1500,
            batch_size: 50,
            request_timeout_secs: 30,
            retry: RetryPolicy::default(),
        }
    }
}

impl CatalogConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let retry_defaults = RetryPolicy::default();

        Self {
            base_url: env_string("POKEAPI_BASE_URL").unwrap_or(defaults.base_url),
            index_limit: env_parse("CATALOG_INDEX_LIMIT", defaults.index_limit),
            batch_size: env_parse("CATALOG_BATCH_SIZE", defaults.batch_size).max(1),
            request_timeout_secs: env_parse(
                "CATALOG_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            ),
            retry: RetryPolicy {
                max_attempts: env_parse("CATALOG_MAX_ATTEMPTS", retry_defaults.max_attempts).max(1),
                jitter_min_ms: env_parse("CATALOG_JITTER_MIN_MS", retry_defaults.jitter_min_ms),
                jitter_max_ms: env_parse("CATALOG_JITTER_MAX_MS", retry_defaults.jitter_max_ms),
                backoff_base_ms: env_parse(
                    "CATALOG_BACKOFF_BASE_MS",
                    retry_defaults.backoff_base_ms,
                ),
            },
        }
    }

    pub fn log_config(&self) {
        info!("📚 Catalog source: {}", self.base_url);
        info!(
            "   Index limit: {}, batch size: {}, request timeout: {}s",
            self.index_limit, self.batch_size, self.request_timeout_secs
        );
        info!(
            "   Detail retries: {} attempts, {}-{}ms jitter, {}ms linear backoff",
            self.retry.max_attempts,
            self.retry.jitter_min_ms,
            self.retry.jitter_max_ms,
            self.retry.backoff_base_ms
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProvider {
    Gemini,
    Ollama,
}

impl ModelProvider {
    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "gemini" | "google" => Some(ModelProvider::Gemini),
            "ollama" => Some(ModelProvider::Ollama),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub provider: ModelProvider,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub timeout_secs: u64,
    pub temperature: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: ModelProvider::Gemini,
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            timeout_secs: 120,
            temperature: 0.1,
        }
    }
}

impl ModelConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let provider = match env_string("LLM_PROVIDER") {
            Some(raw) => ModelProvider::parse(&raw).unwrap_or_else(|| {
                warn!("Unknown LLM_PROVIDER '{}', falling back to gemini", raw);
                ModelProvider::Gemini
            }),
            None => defaults.provider,
        };

        Self {
            provider,
            gemini_api_key: env_string("GEMINI_API_KEY"),
            gemini_model: env_string("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_base_url: env_string("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
            ollama_url: env_string("OLLAMA_URL").unwrap_or(defaults.ollama_url),
            ollama_model: env_string("OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
            timeout_secs: env_parse("LLM_TIMEOUT_SECS", defaults.timeout_secs),
            temperature: env_parse("LLM_TEMPERATURE", defaults.temperature),
        }
    }

    pub fn log_config(&self) {
        match self.provider {
            ModelProvider::Gemini => {
                info!("🤖 Feature extraction via Gemini model {}", self.gemini_model);
                if self.gemini_api_key.is_none() {
                    warn!("   GEMINI_API_KEY is not set");
                }
            }
            ModelProvider::Ollama => {
                info!(
                    "🤖 Feature extraction via Ollama model {} at {}",
                    self.ollama_model, self.ollama_url
                );
            }
        }
        info!(
            "   Timeout: {}s, temperature: {}",
            self.timeout_secs, self.temperature
        );
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub warm_on_start: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            warm_on_start: false,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: env_parse("SEARCH_BIND_ADDR", defaults.bind_addr),
            warm_on_start: env_parse("SEARCH_WARM_ON_START", defaults.warm_on_start),
        }
    }

    pub fn log_config(&self) {
        info!(
            "🌐 Server bind address: {}, warm on start: {}",
            self.bind_addr, self.warm_on_start
        );
    }
}

/// Upper bound for `SEARCH_HISTORY_EXPIRY_DAYS`, roughly a century.
pub const MAX_HISTORY_EXPIRY_DAYS: i64 = 36_500;

#[derive(Debug, Clone)]
pub struct HistoryConfig {
    pub path: PathBuf,
    pub max_entries: usize,
    pub expiry_days: i64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".search_history.json"),
            max_entries: 50,
            expiry_days: 60,
        }
    }
}

impl HistoryConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            path: env_string("SEARCH_HISTORY_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.path),
            max_entries: env_parse("SEARCH_HISTORY_MAX_ENTRIES", defaults.max_entries).max(1),
            expiry_days: env_parse("SEARCH_HISTORY_EXPIRY_DAYS", defaults.expiry_days)
                .clamp(0, MAX_HISTORY_EXPIRY_DAYS),
        }
    }

    pub fn log_config(&self) {
        info!(
            "🗂️  History file: {} (max {} entries, {} day expiry)",
            self.path.display(),
            self.max_entries,
            self.expiry_days
        );
    }
}
