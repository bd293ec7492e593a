use serde::Serialize;

use geostat_core::models::Bounds;
use geostat_store::IngestReport;

/// Upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub records_count: usize,
    pub file_type: &'static str,
    pub columns: Vec<String>,
}

impl From<IngestReport> for UploadResponse {
    fn from(report: IngestReport) -> Self {
        Self {
            message: report.message(),
            records_count: report.records_count,
            file_type: report.kind.as_str(),
            columns: report.columns,
        }
    }
}

/// Extent response; `bounds` is `null` until something is loaded
#[derive(Debug, Serialize)]
pub struct BoundsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub bounds: Option<Bounds>,
}

impl From<Option<Bounds>> for BoundsResponse {
    fn from(bounds: Option<Bounds>) -> Self {
        match bounds {
            Some(bounds) => Self { message: None, bounds: Some(bounds) },
            None => Self { message: Some("Nenhum dado carregado ainda"), bounds: None },
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
}

impl HealthResponse {
    pub fn online() -> Self {
        Self {
            status: "online",
            timestamp: chrono::Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}
