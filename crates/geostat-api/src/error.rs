use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use geostat_core::GeostatError;
use serde::Serialize;

/// Unified API error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<String>,
    pub field: Option<String>,
    pub row: Option<usize>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), details: None, field: None, row: None }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    row: Option<usize>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            detail: self.details.unwrap_or_else(|| self.message.clone()),
            error: self.message,
            field: self.field,
            row: self.row,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<GeostatError> for ApiError {
    fn from(err: GeostatError) -> Self {
        let (status, message) = match &err {
            GeostatError::Schema { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "Invalid dataset structure")
            }
            GeostatError::InvalidGeometry { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "Invalid geometry")
            }
            GeostatError::Format { .. } => (StatusCode::BAD_REQUEST, "Failed to parse file"),
            GeostatError::UnsupportedFormat { .. } => {
                (StatusCode::BAD_REQUEST, "Unsupported file format")
            }
            GeostatError::UploadTooLarge { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, "Upload too large")
            }
            GeostatError::Validation { .. } => (StatusCode::BAD_REQUEST, "Invalid request"),
            _ => {
                tracing::error!(error = %err, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
            }
        };

        Self {
            status,
            message: message.to_string(),
            details: Some(err.to_string()),
            field: err.field().map(str::to_string),
            row: err.row(),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        tracing::error!(error = %err, "Blocking task failed");
        Self::internal("Internal error").with_details(err.to_string())
    }
}
