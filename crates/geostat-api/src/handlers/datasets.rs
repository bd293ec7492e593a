use std::sync::Arc;

use axum::{extract::State, Json};
use geostat_core::models::DatasetStats;

use crate::dto::BoundsResponse;
use crate::state::AppState;

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<DatasetStats> {
    Json(state.store.stats())
}

pub async fn get_bounds(State(state): State<Arc<AppState>>) -> Json<BoundsResponse> {
    Json(BoundsResponse::from(state.store.bounds()))
}
