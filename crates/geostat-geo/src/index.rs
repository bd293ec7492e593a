//! R-tree over record envelopes for radius queries
//!
//! The index only narrows the search: every candidate must still be
//! confirmed with [`distance_to_geometry`](crate::distance::distance_to_geometry).
//! Envelopes are built so that no record within the radius is ever left
//! out of the candidate set:
//!
//! * the search box covers the whole spherical cap around the center,
//!   widening to all longitudes when the cap reaches a pole or crosses the
//!   antimeridian;
//! * polygon boxes are grown in latitude by half the longest edge, since a
//!   great-circle arc can bulge poleward of its endpoints by at most half
//!   its length, and span all longitudes when an edge crosses the
//!   antimeridian.

use rstar::{RTree, RTreeObject, AABB};

use crate::distance::{haversine_distance, EARTH_RADIUS_METERS};
use crate::models::Geometry;

/// Slack added to every box, in degrees (about a centimeter)
const ENVELOPE_EPSILON_DEGREES: f64 = 1e-7;

/// Record id with its search envelope
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedEnvelope {
    /// Position of the record in its collection
    pub id: usize,
    envelope: AABB<[f64; 2]>,
}

impl IndexedEnvelope {
    pub fn new(id: usize, geometry: &Geometry) -> Self {
        Self { id, envelope: geometry_envelope(geometry) }
    }
}

impl RTreeObject for IndexedEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Spatial index for radius candidate lookup
#[derive(Debug)]
pub struct SpatialIndex {
    tree: RTree<IndexedEnvelope>,
}

impl SpatialIndex {
    /// Create a new empty spatial index
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk-load an index from `(id, geometry)` pairs
    pub fn from_geometries<'a>(
        geometries: impl IntoIterator<Item = (usize, &'a Geometry)>,
    ) -> Self {
        let indexed: Vec<IndexedEnvelope> = geometries
            .into_iter()
            .map(|(id, geometry)| IndexedEnvelope::new(id, geometry))
            .collect();

        Self { tree: RTree::bulk_load(indexed) }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Ids of every record that may lie within `radius_meters` of `center`
    /// (`[lng, lat]`), in ascending order
    pub fn candidates_within(&self, center: [f64; 2], radius_meters: f64) -> Vec<usize> {
        let search = search_envelope(center, radius_meters);
        let mut ids: Vec<usize> =
            self.tree.locate_in_envelope_intersecting(&search).map(|e| e.id).collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Box covering every point within `radius_meters` of `center`
pub fn search_envelope(center: [f64; 2], radius_meters: f64) -> AABB<[f64; 2]> {
    let [lng, lat] = center;
    let angular = radius_meters.max(0.0) / EARTH_RADIUS_METERS;
    let dlat = angular.to_degrees();

    let min_lat = (lat - dlat - ENVELOPE_EPSILON_DEGREES).max(-90.0);
    let max_lat = (lat + dlat + ENVELOPE_EPSILON_DEGREES).min(90.0);

    // The cap reaches a pole: every longitude is in range
    if angular >= std::f64::consts::FRAC_PI_2 || min_lat <= -90.0 || max_lat >= 90.0 {
        return AABB::from_corners([-180.0, min_lat], [180.0, max_lat]);
    }

    let ratio = angular.sin() / lat.to_radians().cos();
    if ratio >= 1.0 {
        return AABB::from_corners([-180.0, min_lat], [180.0, max_lat]);
    }

    let dlng = ratio.asin().to_degrees() + ENVELOPE_EPSILON_DEGREES;
    let (min_lng, max_lng) = (lng - dlng, lng + dlng);

    if min_lng < -180.0 || max_lng > 180.0 {
        return AABB::from_corners([-180.0, min_lat], [180.0, max_lat]);
    }

    AABB::from_corners([min_lng, min_lat], [max_lng, max_lat])
}

/// Box covering a geometry and every great-circle edge between its vertices
pub fn geometry_envelope(geometry: &Geometry) -> AABB<[f64; 2]> {
    let bounds = match geometry.bounds() {
        Some(bounds) => bounds,
        None => return AABB::from_point([0.0, 0.0]),
    };

    if let Geometry::Point { coordinates } = geometry {
        return AABB::from_point(*coordinates);
    }

    let mut longest_edge = 0.0_f64;
    let mut crosses_antimeridian = false;
    let rings: Box<dyn Iterator<Item = &Vec<[f64; 2]>> + '_> = match geometry {
        Geometry::Polygon { coordinates } => Box::new(coordinates.iter()),
        Geometry::MultiPolygon { coordinates } => Box::new(coordinates.iter().flatten()),
        Geometry::Point { .. } => Box::new(std::iter::empty()),
    };
    for ring in rings {
        for edge in ring.windows(2) {
            longest_edge = longest_edge.max(haversine_distance(edge[0], edge[1]));
            crosses_antimeridian |= (edge[1][0] - edge[0][0]).abs() > 180.0;
        }
    }

    let pad = (longest_edge / EARTH_RADIUS_METERS).to_degrees() / 2.0 + ENVELOPE_EPSILON_DEGREES;
    let min_lat = (bounds.min_lat - pad).max(-90.0);
    let max_lat = (bounds.max_lat + pad).min(90.0);

    let (min_lng, max_lng) = if crosses_antimeridian || min_lat <= -90.0 || max_lat >= 90.0 {
        (-180.0, 180.0)
    } else {
        (bounds.min_lng - ENVELOPE_EPSILON_DEGREES, bounds.max_lng + ENVELOPE_EPSILON_DEGREES)
    };

    AABB::from_corners([min_lng, min_lat], [max_lng, max_lat])
}
