// src/catalog/client.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::models::{BaseStat, EntityRecord};
use crate::utils::config::CatalogConfig;

/// Name plus detail locator, as listed by the bulk index endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub url: String,
}

/// Read-only remote source of creature records.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Every entity name and locator, in one call.
    async fn fetch_index(&self) -> Result<Vec<CatalogEntry>>;

    /// Detail record for one index entry.
    async fn fetch_detail(&self, entry: &CatalogEntry) -> Result<EntityRecord>;
}

#[derive(Deserialize)]
struct IndexPage {
    results: Vec<CatalogEntry>,
}

#[derive(Deserialize)]
pub(crate) struct NamedResource {
    pub name: String,
}

#[derive(Deserialize)]
struct TypeSlot {
    #[serde(rename = "type")]
    kind: NamedResource,
}

#[derive(Deserialize)]
struct AbilitySlot {
    ability: NamedResource,
}

#[derive(Deserialize)]
struct StatSlot {
    base_stat: u32,
    stat: NamedResource,
}

#[derive(Deserialize, Default)]
struct Artwork {
    front_default: Option<String>,
}

#[derive(Deserialize, Default)]
struct OtherSprites {
    #[serde(rename = "official-artwork", default)]
    official_artwork: Option<Artwork>,
}

#[derive(Deserialize, Default)]
struct Sprites {
    front_default: Option<String>,
    #[serde(default)]
    other: Option<OtherSprites>,
}

/// Detail payload of `GET /pokemon/{id or name}`, reduced to what we keep.
#[derive(Deserialize)]
pub(crate) struct PokemonDetail {
    id: u32,
    name: String,
    #[serde(default)]
    types: Vec<TypeSlot>,
    #[serde(default)]
    abilities: Vec<AbilitySlot>,
    #[serde(default)]
    sprites: Sprites,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    weight: u32,
    #[serde(default)]
    stats: Vec<StatSlot>,
}

impl From<PokemonDetail> for EntityRecord {
    fn from(detail: PokemonDetail) -> Self {
        let artwork_url = detail
            .sprites
            .other
            .and_then(|other| other.official_artwork)
            .and_then(|artwork| artwork.front_default);

        EntityRecord {
            id: detail.id,
            name: detail.name,
            types: detail.types.into_iter().map(|t| t.kind.name).collect(),
            abilities: detail.abilities.into_iter().map(|a| a.ability.name).collect(),
            sprite_url: detail.sprites.front_default,
            artwork_url,
            height: detail.height,
            weight: detail.weight,
            stats: detail
                .stats
                .into_iter()
                .map(|s| BaseStat {
                    name: s.stat.name,
                    value: s.base_stat,
                })
                .collect(),
        }
    }
}

/// PokeAPI v2 client.
pub struct PokeApiClient {
    http: Client,
    base_url: Url,
    index_limit: u32,
}

impl PokeApiClient {
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build PokeAPI HTTP client")?;

        // Url::join drops the last path segment unless the base ends with '/'.
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .with_context(|| format!("Invalid PokeAPI base URL: {}", config.base_url))?;

        Ok(Self {
            http,
            base_url,
            index_limit: config.index_limit,
        })
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Failed to build PokeAPI URL for '{}'", path))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("GET {}", url);
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "PokeAPI returned status {} for {}",
                response.status(),
                url
            ));
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse response from {}", url))
    }

    /// Fetch a single record by numeric id, bypassing any cache.
    pub async fn fetch_record(&self, id: u32) -> Result<EntityRecord> {
        let url = self.endpoint(&format!("pokemon/{}", id))?;
        let detail: PokemonDetail = self.get_json(url).await?;
        Ok(detail.into())
    }
}

#[async_trait]
impl CatalogSource for PokeApiClient {
    async fn fetch_index(&self) -> Result<Vec<CatalogEntry>> {
        let mut url = self.endpoint("pokemon")?;
        url.query_pairs_mut()
            .append_pair("limit", &self.index_limit.to_string());

        let page: IndexPage = self
            .get_json(url)
            .await
            .context("Failed to fetch catalog index")?;
        Ok(page.results)
    }

    async fn fetch_detail(&self, entry: &CatalogEntry) -> Result<EntityRecord> {
        // Index locators are absolute; join also accepts relative ones.
        let url = self
            .base_url
            .join(&entry.url)
            .with_context(|| format!("Invalid detail locator for {}: {}", entry.name, entry.url))?;
        let detail: PokemonDetail = self.get_json(url).await?;
        Ok(detail.into())
    }
}
