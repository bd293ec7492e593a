use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header::InvalidHeaderValue, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Room for multipart framing around the largest accepted file
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the API router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.max_upload_bytes().saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        // Health
        .route("/", get(handlers::health_check))
        .route("/health", get(handlers::health_check))

        // Uploads
        .route("/upload/lotes", post(handlers::upload_lotes))
        .route("/upload/imoveis", post(handlers::upload_imoveis))

        // Layers
        .route("/lotes/geojson", get(handlers::lotes_geojson))
        .route("/imoveis/geojson", get(handlers::imoveis_geojson))
        .route("/stats", get(handlers::get_stats))
        .route("/bounds", get(handlers::get_bounds))

        // Analysis
        .route("/analyze", post(handlers::analyze_area))

        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

/// CORS layer for `origin`; `*` allows any origin
pub fn cors_layer(origin: &str) -> Result<CorsLayer, InvalidHeaderValue> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if origin.trim() == "*" {
        return Ok(cors.allow_origin(Any));
    }

    Ok(cors.allow_origin(origin.trim().parse::<HeaderValue>()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_origin_parsing() {
        assert!(cors_layer("*").is_ok());
        assert!(cors_layer("http://localhost:3000").is_ok());
        assert!(cors_layer("bad\norigin").is_err());
    }
}
