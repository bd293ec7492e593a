//! Geometry models for geostat-geo.
//!
//! This module re-exports canonical types from `geostat-core` and provides
//! conversions to and from the `geo` crate.

use geo::algorithm::centroid::Centroid;
use geo::Geometry as GeoGeometry;

pub use geostat_core::models::{Bounds, Geometry, ValidityMode};

fn to_line_string(ring: &[[f64; 2]]) -> geo::LineString {
    geo::LineString::new(ring.iter().map(|c| geo::Coord { x: c[0], y: c[1] }).collect())
}

/// Build a `geo::Polygon` from GeoJSON-style rings (exterior first)
pub fn to_geo_polygon(rings: &[Vec<[f64; 2]>]) -> geo::Polygon {
    match rings.split_first() {
        Some((exterior, interiors)) => geo::Polygon::new(
            to_line_string(exterior),
            interiors.iter().map(|ring| to_line_string(ring)).collect(),
        ),
        None => geo::Polygon::new(geo::LineString::new(vec![]), vec![]),
    }
}

/// Convert a canonical Geometry to a geo::Geometry
pub fn to_geo_geometry(geom: &Geometry) -> GeoGeometry {
    match geom {
        Geometry::Point { coordinates } => {
            GeoGeometry::Point(geo::Point::new(coordinates[0], coordinates[1]))
        }
        Geometry::Polygon { coordinates } => GeoGeometry::Polygon(to_geo_polygon(coordinates)),
        Geometry::MultiPolygon { coordinates } => GeoGeometry::MultiPolygon(geo::MultiPolygon::new(
            coordinates.iter().map(|poly| to_geo_polygon(poly)).collect(),
        )),
    }
}

fn polygon_rings(polygon: &geo::Polygon) -> Vec<Vec<[f64; 2]>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring| ring.coords().map(|c| [c.x, c.y]).collect())
        .collect()
}

/// Convert a geo::Geometry to a canonical Geometry
///
/// Only points and (multi)polygons have a canonical form; anything else is
/// reported by its type name.
pub fn from_geo_geometry(geom: &GeoGeometry) -> Result<Geometry, String> {
    match geom {
        GeoGeometry::Point(p) => Ok(Geometry::point(p.x(), p.y())),
        GeoGeometry::Polygon(p) => Ok(Geometry::polygon(polygon_rings(p))),
        GeoGeometry::MultiPolygon(mp) => {
            Ok(Geometry::MultiPolygon { coordinates: mp.iter().map(polygon_rings).collect() })
        }
        GeoGeometry::Rect(r) => from_geo_geometry(&GeoGeometry::Polygon(r.to_polygon())),
        GeoGeometry::Triangle(t) => from_geo_geometry(&GeoGeometry::Polygon(t.to_polygon())),
        GeoGeometry::Line(_) => Err("Line".to_string()),
        GeoGeometry::LineString(_) => Err("LineString".to_string()),
        GeoGeometry::MultiPoint(_) => Err("MultiPoint".to_string()),
        GeoGeometry::MultiLineString(_) => Err("MultiLineString".to_string()),
        GeoGeometry::GeometryCollection(_) => Err("GeometryCollection".to_string()),
    }
}

/// Extension trait for Geometry with geo-crate operations
pub trait GeometryExt {
    /// Convert to geo::Geometry
    fn to_geo(&self) -> GeoGeometry;

    /// Representative point `[lng, lat]`: the point itself, or the
    /// polygon centroid
    fn representative_point(&self) -> Option<[f64; 2]>;
}

impl GeometryExt for Geometry {
    fn to_geo(&self) -> GeoGeometry {
        to_geo_geometry(self)
    }

    fn representative_point(&self) -> Option<[f64; 2]> {
        match self {
            Geometry::Point { coordinates } => Some(*coordinates),
            _ => self.to_geo().centroid().map(|p| [p.x(), p.y()]),
        }
    }
}
