// tests/server.rs
mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{build_service, sample_records, FakeCatalog, FakeModel, Reply};
use search_lib::catalog::PokeApiClient;
use search_lib::server::{router, AppState};
use search_lib::utils::config::CatalogConfig;

fn app_with(catalog: FakeCatalog, model: FakeModel, pokeapi_base: &str) -> Router {
    let config = CatalogConfig {
        base_url: pokeapi_base.to_string(),
        ..CatalogConfig::default()
    };
    let state = AppState {
        search: build_service(Arc::new(catalog), Arc::new(model)),
        profiles: Arc::new(PokeApiClient::new(&config).unwrap()),
    };
    router(Arc::new(state))
}

fn search_request(query: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/search")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "query": query }).to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_search_returns_wire_shaped_results() {
    let app = app_with(
        FakeCatalog::new(sample_records()),
        FakeModel::text(r#"{"name": {"en": "Squirtle"}, "types": ["Water"]}"#),
        "http://127.0.0.1:9/api/v2",
    );

    let response = app.oneshot(search_request("a small blue turtle")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert!(body.get("error").is_none());
    let first = &body["results"][0];
    assert_eq!(first["pokemon"]["name"], "squirtle");
    assert_eq!(first["pokemon"]["types"], json!(["water"]));
    assert_eq!(first["matchReason"], "Type: water; abilities: torrent, rain-dish");
    assert!((first["confidence"].as_f64().unwrap() - 0.8).abs() < 1e-9);
}

#[tokio::test]
async fn test_catalog_outage_maps_to_503() {
    let app = app_with(
        FakeCatalog::unavailable(),
        FakeModel::text(r#"{"types": ["Water"]}"#),
        "http://127.0.0.1:9/api/v2",
    );

    let response = app.oneshot(search_request("a small blue turtle")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = json_body(response).await;
    assert_eq!(body["results"], json!([]));
    assert!(body["error"].as_str().unwrap().starts_with("Search failed"));
}

#[tokio::test]
async fn test_panicking_search_maps_to_500() {
    let app = app_with(
        FakeCatalog::new(sample_records()),
        FakeModel::new(Reply::Panic),
        "http://127.0.0.1:9/api/v2",
    );

    let response = app.oneshot(search_request("anything")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = json_body(response).await;
    assert_eq!(body["results"], json!([]));
    assert!(!body["error"].as_str().unwrap().contains("blew up"));
}

#[tokio::test]
async fn test_health_reports_cache_state() {
    let app = app_with(
        FakeCatalog::new(sample_records()),
        FakeModel::text("{}"),
        "http://127.0.0.1:9/api/v2",
    );

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["cache"], "empty");
    assert_eq!(body["cached_entities"], 0);
    assert_eq!(body["model"], "fake");
}

#[tokio::test]
async fn test_profile_route_combines_detail_and_species() {
    let pokeapi = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon/25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 25,
            "name": "pikachu",
            "types": [{"type": {"name": "electric"}}],
            "abilities": [{"ability": {"name": "static"}}],
            "sprites": {"front_default": "https://img/25.png"}
        })))
        .mount(&pokeapi)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon-species/25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "names": [
                {"name": "皮卡丘", "language": {"name": "zh-Hant"}},
                {"name": "ピカチュウ", "language": {"name": "ja"}}
            ]
        })))
        .mount(&pokeapi)
        .await;

    let app = app_with(
        FakeCatalog::new(sample_records()),
        FakeModel::text("{}"),
        &format!("{}/api/v2", pokeapi.uri()),
    );

    let response = app
        .oneshot(Request::builder().uri("/api/pokemon/25").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["name"], "pikachu");
    assert_eq!(body["sprite_url"], "https://img/25.png");
    assert_eq!(body["localized_names"]["en"], "pikachu");
    assert_eq!(body["localized_names"]["zh-Hant"], "皮卡丘");
    assert_eq!(body["localized_names"]["ja"], "ピカチュウ");
}

#[tokio::test]
async fn test_profile_route_reports_upstream_failure() {
    let pokeapi = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&pokeapi)
        .await;

    let app = app_with(
        FakeCatalog::new(sample_records()),
        FakeModel::text("{}"),
        &format!("{}/api/v2", pokeapi.uri()),
    );

    let response = app
        .oneshot(Request::builder().uri("/api/pokemon/99999").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
