//! Geodesic distances on a spherical Earth
//!
//! Point distances use `geo`'s haversine formula. Distances to polygon
//! edges treat each edge as a great-circle arc and use the cross-track and
//! along-track distances, falling back to the nearer endpoint when the
//! perpendicular foot lies outside the arc.

use geo::algorithm::contains::Contains;
use geo::{Distance, Haversine, Point};

use crate::models::{to_geo_polygon, Geometry};

/// Mean Earth radius in meters, the radius `geo::Haversine` uses
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Great-circle distance in meters between two `[lng, lat]` coordinates
pub fn haversine_distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    Haversine.distance(Point::new(a[0], a[1]), Point::new(b[0], b[1]))
}

/// Initial bearing in radians from `a` to `b`
fn initial_bearing(a: [f64; 2], b: [f64; 2]) -> f64 {
    let (phi1, phi2) = (a[1].to_radians(), b[1].to_radians());
    let delta_lambda = (b[0] - a[0]).to_radians();

    let y = delta_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();
    y.atan2(x)
}

/// Distance in meters from `p` to the great-circle arc `a`-`b`
pub fn distance_to_segment(p: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    let d_ap = haversine_distance(a, p) / EARTH_RADIUS_METERS;
    let d_bp = haversine_distance(b, p) / EARTH_RADIUS_METERS;
    let d_ab = haversine_distance(a, b) / EARTH_RADIUS_METERS;
    let nearest_endpoint = d_ap.min(d_bp);

    if d_ab == 0.0 || d_ap == 0.0 {
        return nearest_endpoint * EARTH_RADIUS_METERS;
    }

    let delta = initial_bearing(a, p) - initial_bearing(a, b);

    // Foot of the perpendicular falls before `a`
    if delta.cos() <= 0.0 {
        return nearest_endpoint * EARTH_RADIUS_METERS;
    }

    let cross_track = (d_ap.sin() * delta.sin()).clamp(-1.0, 1.0).asin();
    let along_track = (d_ap.cos() / cross_track.cos()).clamp(-1.0, 1.0).acos();

    // ... or past `b`
    if along_track > d_ab {
        return nearest_endpoint * EARTH_RADIUS_METERS;
    }

    cross_track.abs().min(nearest_endpoint) * EARTH_RADIUS_METERS
}

fn distance_to_rings(p: [f64; 2], rings: &[Vec<[f64; 2]>]) -> f64 {
    if to_geo_polygon(rings).contains(&Point::new(p[0], p[1])) {
        return 0.0;
    }

    rings
        .iter()
        .flat_map(|ring| ring.windows(2))
        .map(|edge| distance_to_segment(p, edge[0], edge[1]))
        .fold(f64::INFINITY, f64::min)
}

/// Minimum distance in meters from `point` (`[lng, lat]`) to a geometry
///
/// Zero when a polygon contains the point.
pub fn distance_to_geometry(point: [f64; 2], geometry: &Geometry) -> f64 {
    match geometry {
        Geometry::Point { coordinates } => haversine_distance(point, *coordinates),
        Geometry::Polygon { coordinates } => distance_to_rings(point, coordinates),
        Geometry::MultiPolygon { coordinates } => coordinates
            .iter()
            .map(|poly| distance_to_rings(point, poly))
            .fold(f64::INFINITY, f64::min),
    }
}
