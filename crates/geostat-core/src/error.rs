//! Error types for Geostat

use thiserror::Error;

use crate::models::DatasetKind;

#[derive(Debug, Error)]
pub enum GeostatError {
    // Upload errors
    #[error("Schema error in {kind} upload: {reason}")]
    Schema { kind: DatasetKind, reason: String },

    #[error("Failed to read {format} data: {reason}")]
    Format { format: String, reason: String },

    #[error("Unsupported file format: {filename}")]
    UnsupportedFormat { filename: String },

    #[error("Upload too large: {size} bytes exceeds the limit of {limit} bytes")]
    UploadTooLarge { size: usize, limit: usize },

    // Geometry errors
    #[error("Invalid geometry at row {row}: {reason}")]
    InvalidGeometry { row: usize, reason: String },

    // Query errors
    #[error("Invalid value for {field}: {value} ({reason})")]
    Validation {
        field: String,
        value: String,
        reason: String,
    },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl GeostatError {
    pub fn validation(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        GeostatError::Validation {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn format(format: impl Into<String>, reason: impl Into<String>) -> Self {
        GeostatError::Format { format: format.into(), reason: reason.into() }
    }

    /// Field name associated with the error, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            GeostatError::Validation { field, .. } => Some(field),
            GeostatError::ConfigMissing { key } | GeostatError::ConfigInvalid { key, .. } => {
                Some(key)
            }
            _ => None,
        }
    }

    /// Row index associated with the error, if any
    pub fn row(&self) -> Option<usize> {
        match self {
            GeostatError::InvalidGeometry { row, .. } => Some(*row),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for GeostatError {
    fn from(err: serde_json::Error) -> Self {
        GeostatError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GeostatError>;
