use axum::Json;

use crate::dto::HealthResponse;

/// Liveness probe served on `/` and `/health`
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::online())
}
