// src/server.rs
// HTTP surface: search, entity profiles and health.

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use log::{info, warn};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::catalog::{CacheStatus, PokeApiClient};
use crate::error::SearchError;
use crate::models::{SearchRequest, SearchResponse};
use crate::search::SearchService;

pub struct AppState {
    pub search: Arc<SearchService>,
    pub profiles: Arc<PokeApiClient>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    cache: CacheStatus,
    cached_entities: usize,
    model: String,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/search", post(search))
        .route("/api/pokemon/:id", get(profile))
        .route("/health", get(health))
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr, warm_on_start: bool) -> Result<()> {
    if warm_on_start {
        let cache = state.search.cache().clone();
        tokio::spawn(async move {
            if let Err(e) = cache.ensure_ready().await {
                warn!("⚠️  Warm-up failed, searches will report it: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("🚀 Search server listening on http://{}", addr);

    axum::serve(listener, router(state))
        .await
        .context("Search server stopped unexpectedly")
}

fn status_for(error: &SearchError) -> StatusCode {
    match error {
        SearchError::CatalogUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        SearchError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// POST /api/search
async fn search(State(state): State<Arc<AppState>>, Json(request): Json<SearchRequest>) -> Response {
    match state.search.clone().search_guarded(request.query).await {
        Ok(results) => Json(SearchResponse::ok(results)).into_response(),
        Err(e) => (status_for(&e), Json(SearchResponse::failed(e.user_message()))).into_response(),
    }
}

/// GET /api/pokemon/:id
async fn profile(State(state): State<Arc<AppState>>, Path(id): Path<u32>) -> Response {
    match state.profiles.fetch_profile(id).await {
        Ok(profile) => Json(profile).into_response(),
        Err(e) => {
            warn!("⚠️  Profile lookup for {} failed: {:#}", id, e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: format!("Could not load entity {}", id),
                }),
            )
                .into_response()
        }
    }
}

/// GET /health
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let cache = state.search.cache();
    Json(HealthResponse {
        status: "ok",
        cache: cache.status().await,
        cached_entities: cache.len().await,
        model: state.search.model_name().to_string(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
