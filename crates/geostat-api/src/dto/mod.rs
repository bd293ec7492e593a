mod request;
mod response;

pub use request::{AnalyzeRequest, GeoJsonParams};
pub use response::{BoundsResponse, HealthResponse, UploadResponse};
