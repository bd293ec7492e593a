//! Canonical geometry types used across all geostat crates.
//!
//! These types serialize as GeoJSON geometries and are converted to `geo`
//! crate types for computation. Coordinates are `[longitude, latitude]` in
//! WGS 84 degrees.

use serde::{Deserialize, Serialize};

/// Geometry validation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ValidityMode {
    /// Strict validation - reject open rings
    #[serde(alias = "strict")]
    Strict,
    /// Lenient validation - close open rings by repeating the first vertex
    #[default]
    #[serde(alias = "lenient")]
    Lenient,
}

/// GeoJSON-compatible geometry representation
///
/// Parcels resolve to `Polygon` or `MultiPolygon`, listings to `Point`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        coordinates: [f64; 2],
    },
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
}

impl Geometry {
    /// Create a Point geometry from longitude and latitude
    pub fn point(lng: f64, lat: f64) -> Self {
        Geometry::Point { coordinates: [lng, lat] }
    }

    /// Create a Polygon geometry
    pub fn polygon(rings: Vec<Vec<[f64; 2]>>) -> Self {
        Geometry::Polygon { coordinates: rings }
    }

    /// Iterate over every coordinate of the geometry, ring closures included
    pub fn coords(&self) -> Box<dyn Iterator<Item = [f64; 2]> + '_> {
        match self {
            Geometry::Point { coordinates } => Box::new(std::iter::once(*coordinates)),
            Geometry::Polygon { coordinates } => {
                Box::new(coordinates.iter().flat_map(|ring| ring.iter().copied()))
            }
            Geometry::MultiPolygon { coordinates } => Box::new(
                coordinates.iter().flat_map(|poly| poly.iter().flat_map(|r| r.iter().copied())),
            ),
        }
    }

    /// Bounding box of all coordinates
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_coords(self.coords())
    }

    /// Try to parse from a serde_json::Value (GeoJSON)
    pub fn from_geojson(value: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    /// Convert to serde_json::Value (GeoJSON)
    pub fn to_geojson(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Axis-aligned bounding box in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

impl Bounds {
    /// Degenerate box around a single coordinate
    pub fn from_coord(coord: [f64; 2]) -> Self {
        Self { min_lng: coord[0], min_lat: coord[1], max_lng: coord[0], max_lat: coord[1] }
    }

    /// Smallest box covering the coordinates, `None` when there are none
    pub fn from_coords(coords: impl IntoIterator<Item = [f64; 2]>) -> Option<Self> {
        let mut iter = coords.into_iter();
        let mut bounds = Self::from_coord(iter.next()?);
        for coord in iter {
            bounds.extend(coord);
        }
        Some(bounds)
    }

    /// Grow the box to cover a coordinate
    pub fn extend(&mut self, coord: [f64; 2]) {
        self.min_lng = self.min_lng.min(coord[0]);
        self.min_lat = self.min_lat.min(coord[1]);
        self.max_lng = self.max_lng.max(coord[0]);
        self.max_lat = self.max_lat.max(coord[1]);
    }

    /// Smallest box covering both boxes
    pub fn merge(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_lng: self.min_lng.min(other.min_lng),
            min_lat: self.min_lat.min(other.min_lat),
            max_lng: self.max_lng.max(other.max_lng),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    pub fn contains(&self, coord: [f64; 2]) -> bool {
        coord[0] >= self.min_lng
            && coord[0] <= self.max_lng
            && coord[1] >= self.min_lat
            && coord[1] <= self.max_lat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_serialization() {
        let point = Geometry::point(-40.3, -20.3);
        let json = serde_json::to_string(&point).unwrap();
        assert!(json.contains("Point"));
        assert!(json.contains("-40.3"));

        let parsed: Geometry = serde_json::from_str(&json).unwrap();
        assert_eq!(point, parsed);
    }

    #[test]
    fn test_polygon_from_geojson() {
        let value = serde_json::json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
        });
        let geom = Geometry::from_geojson(&value).unwrap();
        assert!(matches!(geom, Geometry::Polygon { .. }));
        assert_eq!(geom.coords().count(), 4);
    }

    #[test]
    fn test_unsupported_geometry_type() {
        let value = serde_json::json!({
            "type": "LineString",
            "coordinates": [[0.0, 0.0], [1.0, 1.0]]
        });
        assert!(Geometry::from_geojson(&value).is_none());
    }

    #[test]
    fn test_bounds_from_coords() {
        let bounds = Bounds::from_coords(vec![[1.0, 5.0], [-2.0, 3.0], [4.0, -1.0]]).unwrap();
        assert_eq!(bounds.min_lng, -2.0);
        assert_eq!(bounds.max_lng, 4.0);
        assert_eq!(bounds.min_lat, -1.0);
        assert_eq!(bounds.max_lat, 5.0);
        assert!(Bounds::from_coords(Vec::new()).is_none());
    }

    #[test]
    fn test_bounds_serialize_camel_case() {
        let json = serde_json::to_value(Bounds::from_coord([1.0, 2.0])).unwrap();
        assert_eq!(json["minLng"], 1.0);
        assert_eq!(json["maxLat"], 2.0);
    }
}
