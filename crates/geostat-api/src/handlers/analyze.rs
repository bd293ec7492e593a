use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use geostat_core::models::AnalysisResult;

use crate::dto::AnalyzeRequest;
use crate::error::ApiError;
use crate::services::QueryService;
use crate::state::AppState;

pub async fn analyze_area(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        ApiError::new(rejection.status(), "Invalid request body")
            .with_details(rejection.body_text())
    })?;

    let query = request.into_query(state.default_radius_meters());
    tracing::info!(
        latitude = query.latitude,
        longitude = query.longitude,
        radius_meters = query.radius_meters,
        "Processing analyze request"
    );

    let result = QueryService::analyze(&state, query).await?;
    Ok(Json(result))
}
