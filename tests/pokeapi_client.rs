// tests/pokeapi_client.rs
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use search_lib::catalog::{CacheStatus, CatalogSource, DatasetCache, PokeApiClient};
use search_lib::error::SearchError;
use search_lib::utils::config::{CatalogConfig, RetryPolicy};

fn config_for(server: &MockServer) -> CatalogConfig {
    CatalogConfig {
        base_url: format!("{}/api/v2", server.uri()),
        index_limit: 3,
        batch_size: 2,
        retry: RetryPolicy::immediate(3),
        ..CatalogConfig::default()
    }
}

fn detail(id: u32, name: &str, kind: &str, ability: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "types": [{"slot": 1, "type": {"name": kind}}],
        "abilities": [{"ability": {"name": ability}, "is_hidden": false}],
        "sprites": {"front_default": null}
    })
}

async fn mount_index(server: &MockServer) {
    let base = format!("{}/api/v2", server.uri());
    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon"))
        .and(query_param("limit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 3,
            "results": [
                {"name": "bulbasaur", "url": format!("{}/pokemon/1/", base)},
                {"name": "ivysaur", "url": format!("{}/pokemon/2/", base)},
                {"name": "venusaur", "url": format!("{}/pokemon/3/", base)}
            ]
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_index_and_detail_round_trip() {
    let server = MockServer::start().await;
    mount_index(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail(1, "bulbasaur", "grass", "overgrow")))
        .mount(&server)
        .await;

    let client = PokeApiClient::new(&config_for(&server)).unwrap();
    let index = client.fetch_index().await.unwrap();
    assert_eq!(index.len(), 3);
    assert_eq!(index[0].name, "bulbasaur");

    let record = client.fetch_detail(&index[0]).await.unwrap();
    assert_eq!(record.id, 1);
    assert_eq!(record.types, vec!["grass"]);
    assert_eq!(record.abilities, vec!["overgrow"]);
}

#[tokio::test]
async fn test_cache_drops_entity_after_three_failed_attempts() {
    let server = MockServer::start().await;
    mount_index(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail(1, "bulbasaur", "grass", "overgrow")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon/2/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon/3/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail(3, "venusaur", "grass", "chlorophyll")))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let client = Arc::new(PokeApiClient::new(&config).unwrap());
    let cache = DatasetCache::new(client, &config);

    let catalog = cache.ensure_ready().await.unwrap();
    let names: Vec<&str> = catalog.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["bulbasaur", "venusaur"]);
    assert!(catalog.get("IVYSAUR").is_none());
    assert_eq!(cache.status().await, CacheStatus::Ready);
}

#[tokio::test]
async fn test_index_outage_leaves_cache_failed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let cache = DatasetCache::new(Arc::new(PokeApiClient::new(&config).unwrap()), &config);

    let first = cache.ensure_ready().await.unwrap_err();
    let second = cache.ensure_ready().await.unwrap_err();
    assert!(matches!(first, SearchError::CatalogUnavailable(_)));
    assert!(matches!(second, SearchError::CatalogUnavailable(_)));
    assert_eq!(cache.status().await, CacheStatus::Failed);
}
