use std::sync::Arc;

use geostat_core::models::DatasetKind;
use geostat_store::{ingest, IngestReport};

use crate::error::ApiError;
use crate::state::AppState;

/// Service for replacing datasets from uploads
pub struct IngestService;

impl IngestService {
    /// Decode an uploaded file and replace the collection of `kind`
    ///
    /// Parsing runs on the blocking pool.
    pub async fn ingest_file(
        state: &AppState,
        kind: DatasetKind,
        filename: String,
        data: Vec<u8>,
    ) -> Result<IngestReport, ApiError> {
        let store = Arc::clone(&state.store);
        let options = state.ingest_options();

        let report = tokio::task::spawn_blocking(move || {
            ingest(&*store, kind, &filename, &data, options)
        })
        .await??;

        Ok(report)
    }
}
