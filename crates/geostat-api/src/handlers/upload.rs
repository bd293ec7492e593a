use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use geostat_core::models::DatasetKind;

use crate::dto::UploadResponse;
use crate::error::ApiError;
use crate::services::IngestService;
use crate::state::AppState;

pub async fn upload_lotes(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    handle_upload(&state, DatasetKind::Lotes, multipart).await
}

pub async fn upload_imoveis(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    handle_upload(&state, DatasetKind::Imoveis, multipart).await
}

async fn handle_upload(
    state: &AppState,
    kind: DatasetKind,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    tracing::info!(kind = %kind, "Processing upload request");

    let (filename, data) = extract_file(&mut multipart).await?;

    tracing::info!(filename = %filename, size = data.len(), "Received file for ingestion");

    let report = IngestService::ingest_file(state, kind, filename, data).await?;
    Ok(Json(UploadResponse::from(report)))
}

async fn extract_file(multipart: &mut Multipart) -> Result<(String, Vec<u8>), ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::new(e.status(), "Failed to parse multipart form").with_details(e.body_text())
    })? {
        let name = field.name().unwrap_or("").to_string();

        if name == "file" {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let data = field.bytes().await.map_err(|e| {
                ApiError::new(e.status(), "Failed to read file data").with_details(e.body_text())
            })?;
            return Ok((filename, data.to_vec()));
        }
    }

    Err(ApiError::bad_request("No file provided")
        .with_details("Expected a 'file' field in the multipart form"))
}
