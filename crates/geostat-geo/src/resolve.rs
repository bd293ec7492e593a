//! Geometry resolution for uploaded rows
//!
//! A row may carry geometry in several encodings: a GeoJSON object, a
//! string holding GeoJSON or WKT, a vertex list, or separate latitude and
//! longitude columns. Sources are tried in a fixed order and the first one
//! that yields valid geometry wins. A row where every source fails (or that
//! has none) is reported with the first failure reason.

use serde_json::Value;
use wkt::TryFromWkt;

use geostat_core::normalize::{fields, parse_number, NormalizedRow};
use geostat_core::GeostatError;

use crate::models::{from_geo_geometry, Geometry, GeometryExt, ValidityMode};
use crate::validation::{prepare_geometry, validate_geometry};

/// A row whose geometry could not be resolved
///
/// The row is kept but takes no part in spatial queries or export.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryWarning {
    pub row: usize,
    pub reason: String,
}

impl std::fmt::Display for GeometryWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {}: {}", self.row, self.reason)
    }
}

impl From<GeometryWarning> for GeostatError {
    fn from(warning: GeometryWarning) -> Self {
        GeostatError::InvalidGeometry { row: warning.row, reason: warning.reason }
    }
}

type Attempt<'a> = &'a dyn Fn() -> Option<Result<Geometry, String>>;

fn first_resolved(
    row: &NormalizedRow,
    attempts: &[Attempt<'_>],
) -> Result<Geometry, GeometryWarning> {
    let mut failure: Option<String> = None;

    for attempt in attempts {
        match attempt() {
            Some(Ok(geometry)) => return Ok(geometry),
            Some(Err(reason)) => {
                failure.get_or_insert(reason);
            }
            None => {}
        }
    }

    Err(GeometryWarning {
        row: row.index,
        reason: failure.unwrap_or_else(|| "no geometry".to_string()),
    })
}

/// Resolve a parcel's polygon from its `geometry` or `vertices` field
pub fn resolve_parcel_geometry(
    row: &NormalizedRow,
    mode: ValidityMode,
) -> Result<Geometry, GeometryWarning> {
    let as_polygon = |geometry: Geometry| match geometry {
        Geometry::Point { .. } => Err("expected a polygon, found Point".to_string()),
        other => prepare_geometry(other, mode).map_err(|e| e.to_string()),
    };

    let from_geometry = || {
        row.get(fields::GEOMETRY).map(|v| parse_geometry_value(v).and_then(&as_polygon))
    };
    let from_vertices = || {
        row.get(fields::VERTICES)
            .map(|v| parse_vertices(v).and_then(|ring| as_polygon(Geometry::polygon(vec![ring]))))
    };

    first_resolved(row, &[&from_geometry, &from_vertices])
}

/// Resolve a listing's point from latitude/longitude, a point geometry, or
/// the centroid of a polygon
pub fn resolve_listing_geometry(
    row: &NormalizedRow,
    mode: ValidityMode,
) -> Result<Geometry, GeometryWarning> {
    let as_point = |geometry: Geometry| -> Result<Geometry, String> {
        let geometry = prepare_geometry(geometry, mode).map_err(|e| e.to_string())?;
        geometry
            .representative_point()
            .map(|[lng, lat]| Geometry::point(lng, lat))
            .ok_or_else(|| "polygon has no centroid".to_string())
    };

    let from_coordinates = || match (row.get(fields::LATITUDE), row.get(fields::LONGITUDE)) {
        (Some(lat), Some(lng)) => Some(point_from_columns(lat, lng)),
        (Some(_), None) => Some(Err("latitude present without longitude".to_string())),
        (None, Some(_)) => Some(Err("longitude present without latitude".to_string())),
        (None, None) => None,
    };
    let from_geometry =
        || row.get(fields::GEOMETRY).map(|v| parse_geometry_value(v).and_then(&as_point));
    let from_vertices = || {
        row.get(fields::VERTICES)
            .map(|v| parse_vertices(v).and_then(|ring| as_point(Geometry::polygon(vec![ring]))))
    };

    first_resolved(row, &[&from_coordinates, &from_geometry, &from_vertices])
}

fn point_from_columns(lat: &Value, lng: &Value) -> Result<Geometry, String> {
    let lat = parse_number(lat).ok_or_else(|| format!("non-numeric latitude {}", lat))?;
    let lng = parse_number(lng).ok_or_else(|| format!("non-numeric longitude {}", lng))?;

    let point = Geometry::point(lng, lat);
    match validate_geometry(&point).first_error() {
        Some(error) => Err(error.reason.clone()),
        None => Ok(point),
    }
}

/// Parse a geometry cell: a GeoJSON geometry or feature object, a string
/// holding GeoJSON or WKT, or a bare vertex array (read as a polygon)
///
/// The result is not validated.
pub fn parse_geometry_value(value: &Value) -> Result<Geometry, String> {
    match value {
        Value::Object(_) => parse_geojson(value),
        Value::Array(_) => parse_vertices(value).map(|ring| Geometry::polygon(vec![ring])),
        Value::String(s) => {
            let s = s.trim();
            if s.starts_with('{') || s.starts_with('[') {
                let parsed: Value =
                    serde_json::from_str(s).map_err(|e| format!("invalid JSON geometry: {}", e))?;
                parse_geometry_value(&parsed)
            } else {
                let geometry = geo::Geometry::<f64>::try_from_wkt_str(s)
                    .map_err(|e| format!("invalid WKT: {}", e))?;
                from_geo_geometry(&geometry)
                    .map_err(|kind| format!("unsupported geometry type {}", kind))
            }
        }
        other => Err(format!("expected GeoJSON or WKT geometry, found {}", other)),
    }
}

fn parse_geojson(value: &Value) -> Result<Geometry, String> {
    let geometry = match geojson::GeoJson::from_json_value(value.clone())
        .map_err(|e| format!("invalid GeoJSON: {}", e))?
    {
        geojson::GeoJson::Geometry(geometry) => geometry,
        geojson::GeoJson::Feature(feature) => {
            feature.geometry.ok_or_else(|| "feature has no geometry".to_string())?
        }
        geojson::GeoJson::FeatureCollection(_) => {
            return Err("expected a geometry, found FeatureCollection".to_string())
        }
    };

    let geometry: geo::Geometry<f64> =
        geometry.try_into().map_err(|e| format!("invalid GeoJSON geometry: {}", e))?;
    from_geo_geometry(&geometry).map_err(|kind| format!("unsupported geometry type {}", kind))
}

/// Parse a vertex list: a JSON array of `[lng, lat]` pairs, or a string of
/// `"lng lat"` pairs separated by commas or semicolons
pub fn parse_vertices(value: &Value) -> Result<Vec<[f64; 2]>, String> {
    match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                parse_pair(item).ok_or_else(|| format!("vertex {} is not a [lng, lat] pair", i))
            })
            .collect(),
        Value::String(s) => {
            let s = s.trim();
            if s.starts_with('[') {
                let parsed: Value =
                    serde_json::from_str(s).map_err(|e| format!("invalid vertex list: {}", e))?;
                return parse_vertices(&parsed);
            }

            s.split([',', ';'])
                .map(str::trim)
                .filter(|pair| !pair.is_empty())
                .enumerate()
                .map(|(i, pair)| {
                    let numbers: Result<Vec<f64>, _> =
                        pair.split_whitespace().map(str::parse::<f64>).collect();
                    match numbers.as_deref() {
                        Ok([lng, lat]) => Ok([*lng, *lat]),
                        _ => Err(format!("vertex {} is not a \"lng lat\" pair: '{}'", i, pair)),
                    }
                })
                .collect()
        }
        other => Err(format!("expected a vertex list, found {}", other)),
    }
}

fn parse_pair(item: &Value) -> Option<[f64; 2]> {
    match item.as_array()?.as_slice() {
        [lng, lat, ..] => Some([parse_number(lng)?, parse_number(lat)?]),
        _ => None,
    }
}
