use std::sync::Arc;

use geojson::FeatureCollection;
use geostat_core::models::{AnalysisQuery, AnalysisResult, DatasetKind};
use geostat_store::{analyze, export::export_collection};

use crate::error::ApiError;
use crate::state::AppState;

/// Service for radius analysis and GeoJSON export
pub struct QueryService;

impl QueryService {
    /// Run a radius analysis on the blocking pool
    pub async fn analyze(
        state: &AppState,
        query: AnalysisQuery,
    ) -> Result<AnalysisResult, ApiError> {
        let store = Arc::clone(&state.store);
        let max_radius = state.max_radius_meters();

        let result =
            tokio::task::spawn_blocking(move || analyze(&*store, &query, max_radius))
                .await??;

        Ok(result)
    }

    /// Export one collection as GeoJSON
    pub async fn features(
        state: &AppState,
        kind: DatasetKind,
        neighborhood: Option<String>,
        limit: usize,
    ) -> Result<FeatureCollection, ApiError> {
        let store = Arc::clone(&state.store);

        let collection = tokio::task::spawn_blocking(move || {
            let neighborhood = neighborhood.as_deref();
            match kind {
                DatasetKind::Lotes => export_collection(&store.parcels(), neighborhood, limit),
                DatasetKind::Imoveis => export_collection(&store.listings(), neighborhood, limit),
            }
        })
        .await?;

        Ok(collection)
    }
}
