use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Statistics;
use crate::error::{GeostatError, Result};

/// Radius used when a query does not name one
pub const DEFAULT_RADIUS_METERS: f64 = 1000.0;

/// Query center in WGS 84 degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueryPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// A radius analysis request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
    /// Property equality filters; a filter only applies to a collection
    /// whose records expose that property
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub filters: Map<String, Value>,
}

impl AnalysisQuery {
    pub fn new(latitude: f64, longitude: f64, radius_meters: f64) -> Self {
        Self { latitude, longitude, radius_meters, filters: Map::new() }
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    pub fn point(&self) -> QueryPoint {
        QueryPoint { latitude: self.latitude, longitude: self.longitude }
    }

    /// Reject out-of-domain coordinates and radii; values are never clamped
    pub fn validate(&self, max_radius_meters: f64) -> Result<()> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(GeostatError::validation(
                "latitude",
                self.latitude,
                "must be between -90 and 90",
            ));
        }

        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(GeostatError::validation(
                "longitude",
                self.longitude,
                "must be between -180 and 180",
            ));
        }

        if !self.radius_meters.is_finite() || self.radius_meters <= 0.0 {
            return Err(GeostatError::validation(
                "radius_meters",
                self.radius_meters,
                "must be a positive number",
            ));
        }

        if self.radius_meters > max_radius_meters {
            return Err(GeostatError::validation(
                "radius_meters",
                self.radius_meters,
                format!("must not exceed {} meters", max_radius_meters),
            ));
        }

        Ok(())
    }
}

/// Outcome of a radius analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub point: QueryPoint,
    pub radius_meters: f64,
    pub lotes_encontrados: usize,
    pub imoveis_encontrados: usize,
    pub estatisticas: Statistics,
    /// Matched parcels as GeoJSON features, in upload order
    pub lotes: Vec<geojson::Feature>,
    /// Matched listings as GeoJSON features, in upload order
    pub imoveis: Vec<geojson::Feature>,
}
