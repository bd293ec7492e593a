//! GeoJSON format reader implementation

use serde_json::{Map, Value};

use crate::error::{GeostatError, Result};
use crate::formats::{strip_bom, Table, TabularReader};

/// Column that carries each feature's geometry
pub const GEOMETRY_COLUMN: &str = "geometry";

/// GeoJSON reader; every feature becomes one row of properties plus a
/// `geometry` column holding the GeoJSON geometry object
pub struct GeoJsonReader;

impl TabularReader for GeoJsonReader {
    fn read(&self, bytes: &[u8]) -> Result<Table> {
        let content = std::str::from_utf8(strip_bom(bytes))
            .map_err(|e| GeostatError::format("GeoJSON", format!("Invalid UTF-8: {}", e)))?;
        table_from_geojson(content)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["geojson"]
    }

    fn format_name(&self) -> &str {
        "GeoJSON"
    }
}

/// Parse GeoJSON text into a table
pub(crate) fn table_from_geojson(content: &str) -> Result<Table> {
    let geojson: ::geojson::GeoJson = content.parse().map_err(|e| {
        GeostatError::format("GeoJSON", format!("Failed to parse GeoJSON: {}", e))
    })?;

    let rows = match geojson {
        ::geojson::GeoJson::FeatureCollection(fc) => {
            fc.features.iter().map(feature_to_object).collect::<Result<Vec<_>>>()?
        }
        ::geojson::GeoJson::Feature(feature) => vec![feature_to_object(&feature)?],
        ::geojson::GeoJson::Geometry(geometry) => {
            let mut object = Map::new();
            object.insert(GEOMETRY_COLUMN.to_string(), serde_json::to_value(&geometry)?);
            vec![object]
        }
    };

    Ok(Table::from_objects(rows))
}

/// Convert a GeoJSON feature to a flat object of properties and geometry
fn feature_to_object(feature: &::geojson::Feature) -> Result<Map<String, Value>> {
    let mut object = feature.properties.clone().unwrap_or_default();

    let geometry = match &feature.geometry {
        Some(geometry) => serde_json::to_value(geometry)?,
        None => Value::Null,
    };
    object.insert(GEOMETRY_COLUMN.to_string(), geometry);

    Ok(object)
}
