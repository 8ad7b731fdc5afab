//! Route configuration and setup

use crate::api_doc::ApiDoc;
use crate::constants::{API_PREFIX, BODY_LIMIT_SLACK_BYTES, DEFAULT_HTTP_CONCURRENCY_LIMIT};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, put},
    Json, Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tubely_core::{Config, StorageBackend};
use utoipa::OpenApi;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;

    // Server-level concurrency limit to protect against resource exhaustion under extreme load
    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_HTTP_CONCURRENCY_LIMIT)
        .max(1);
    tracing::info!(
        http_concurrency_limit = http_concurrency_limit,
        "HTTP concurrency limit layer enabled"
    );

    let mut app = api_routes(config)
        .with_state(state)
        .route("/health", get(health_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        );

    if config.storage_backend() == StorageBackend::Local {
        tracing::info!(
            assets_root = %config.assets_root().display(),
            "Serving local assets under /assets"
        );
        app = app.nest_service("/assets", ServeDir::new(config.assets_root()));
    }

    Ok(app
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

/// Video routes, still waiting for their state.
///
/// Upload routes get a body limit a little above the staging limit so the
/// stager reports oversize files itself.
pub fn api_routes(config: &Config) -> Router<Arc<AppState>> {
    let thumbnail_limit = config.max_thumbnail_size_bytes() + BODY_LIMIT_SLACK_BYTES;
    let video_limit = config.max_video_size_bytes() + BODY_LIMIT_SLACK_BYTES;

    Router::new()
        .route(
            &format!("{}/thumbnail_upload/{{video_id}}", API_PREFIX),
            put(handlers::thumbnail_upload::upload_thumbnail)
                .layer(DefaultBodyLimit::max(thumbnail_limit)),
        )
        .route(
            &format!("{}/video_upload/{{video_id}}", API_PREFIX),
            put(handlers::video_upload::upload_video).layer(DefaultBodyLimit::max(video_limit)),
        )
        .route(
            &format!("{}/videos/{{video_id}}", API_PREFIX),
            get(handlers::video_get::get_video),
        )
        .route(
            &format!("{}/thumbnails/{{video_id}}", API_PREFIX),
            get(handlers::thumbnail_get::get_thumbnail),
        )
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::PUT, Method::OPTIONS];
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin {:?}: {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
