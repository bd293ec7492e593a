use serde::Deserialize;
use serde_json::{Map, Value};

use geostat_core::models::AnalysisQuery;

/// Analyze request body
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: Option<f64>,
    pub filters: Option<Map<String, Value>>,
}

impl AnalyzeRequest {
    /// Build the engine query, using `default_radius` when none was sent
    pub fn into_query(self, default_radius: f64) -> AnalysisQuery {
        AnalysisQuery {
            latitude: self.latitude,
            longitude: self.longitude,
            radius_meters: self.radius_meters.unwrap_or(default_radius),
            filters: self.filters.unwrap_or_default(),
        }
    }
}

/// Query string for the GeoJSON endpoints
#[derive(Debug, Default, Deserialize)]
pub struct GeoJsonParams {
    pub bairro: Option<String>,
    /// Feature cap; `0` disables it
    pub limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_defaults() {
        let request: AnalyzeRequest =
            serde_json::from_str(r#"{"latitude": -20.3, "longitude": -40.3}"#).unwrap();
        let query = request.into_query(1000.0);

        assert_eq!(query.radius_meters, 1000.0);
        assert!(query.filters.is_empty());
    }

    #[test]
    fn test_null_filters() {
        let request: AnalyzeRequest = serde_json::from_str(
            r#"{"latitude": 0, "longitude": 0, "radius_meters": 50, "filters": null}"#,
        )
        .unwrap();
        assert_eq!(request.into_query(1000.0).radius_meters, 50.0);
    }
}
