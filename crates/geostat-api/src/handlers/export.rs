use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use geojson::FeatureCollection;
use geostat_core::models::DatasetKind;

use crate::dto::GeoJsonParams;
use crate::error::ApiError;
use crate::services::QueryService;
use crate::state::AppState;

pub async fn lotes_geojson(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GeoJsonParams>,
) -> Result<Json<FeatureCollection>, ApiError> {
    export(&state, DatasetKind::Lotes, params).await
}

pub async fn imoveis_geojson(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GeoJsonParams>,
) -> Result<Json<FeatureCollection>, ApiError> {
    export(&state, DatasetKind::Imoveis, params).await
}

async fn export(
    state: &AppState,
    kind: DatasetKind,
    params: GeoJsonParams,
) -> Result<Json<FeatureCollection>, ApiError> {
    let limit = params.limit.unwrap_or_else(|| state.feature_limit());

    let collection = QueryService::features(state, kind, params.bairro, limit).await?;

    tracing::debug!(kind = %kind, features = collection.features.len(), "Exported GeoJSON");
    Ok(Json(collection))
}
