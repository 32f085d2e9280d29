//! Route configuration and the middleware stack.

use std::sync::Arc;

use atelier_core::Config;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::api_doc::ApiDoc;
use crate::handlers::{artworks, engagement, health, media};
use crate::middleware::{security_headers_middleware, SecurityHeadersConfig};
use crate::state::AppState;

/// Headroom for the text fields and multipart framing around the image.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;
const DEFAULT_CONCURRENCY_LIMIT: usize = 10_000;

pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;

    let security_headers_config = Arc::new(SecurityHeadersConfig::new(
        super::storage::media_origins(config),
        config.is_production(),
    ));

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_CONCURRENCY_LIMIT)
        .max(1);

    let app = Router::new()
        .merge(artwork_routes())
        .merge(engagement_routes())
        .route("/media/{*key}", get(media::serve_media))
        .route("/health", get(health::health_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(
            config.max_upload_size_bytes() + MULTIPART_OVERHEAD_BYTES,
        ))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn_with_state(
            security_headers_config,
            security_headers_middleware,
        ))
        .with_state(state);

    Ok(app)
}

fn artwork_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/artworks",
            post(artworks::upload_artwork).get(artworks::list_artworks),
        )
        .route(
            "/api/artworks/{id}",
            get(artworks::get_artwork).delete(artworks::delete_artwork),
        )
}

fn engagement_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/artworks/{id}/like",
            post(engagement::like_artwork).delete(engagement::unlike_artwork),
        )
        .route("/api/artworks/{id}/view", post(engagement::record_view))
        .route(
            "/api/artworks/{id}/comments",
            get(engagement::list_comments).post(engagement::create_comment),
        )
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];

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
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
