use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, Line};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};

use crate::models::{Geometry, ValidityMode};

/// Validation result with details
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

/// Validation error with location details
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub location: String,
    pub reason: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.location, self.reason)
    }
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid() -> Self {
        Self { is_valid: true, errors: Vec::new() }
    }

    /// Add an error to the result
    pub fn add_error(&mut self, location: String, reason: String) {
        self.is_valid = false;
        self.errors.push(ValidationError { location, reason });
    }

    fn merge(&mut self, prefix: &str, other: ValidationResult) {
        for error in other.errors {
            self.add_error(format!("{}.{}", prefix, error.location), error.reason);
        }
    }

    /// First error, if any
    pub fn first_error(&self) -> Option<&ValidationError> {
        self.errors.first()
    }
}

/// Validate a geometry
///
/// Coordinates must be finite WGS 84 degrees. Polygon rings must be closed,
/// have at least three distinct vertices and must not cross or touch
/// themselves.
pub fn validate_geometry(geometry: &Geometry) -> ValidationResult {
    match geometry {
        Geometry::Point { coordinates } => validate_coord("Point", *coordinates),
        Geometry::Polygon { coordinates } => validate_polygon(coordinates),
        Geometry::MultiPolygon { coordinates } => {
            let mut result = ValidationResult::valid();
            if coordinates.is_empty() {
                result.add_error("MultiPolygon".to_string(), "MultiPolygon is empty".to_string());
            }
            for (i, polygon) in coordinates.iter().enumerate() {
                result.merge(&format!("MultiPolygon[{}]", i), validate_polygon(polygon));
            }
            result
        }
    }
}

fn validate_coord(location: &str, coord: [f64; 2]) -> ValidationResult {
    let mut result = ValidationResult::valid();
    let [lng, lat] = coord;

    if !lng.is_finite() || !lat.is_finite() {
        result.add_error(location.to_string(), "Coordinates must be finite".to_string());
    } else if !(-180.0..=180.0).contains(&lng) || !(-90.0..=90.0).contains(&lat) {
        result.add_error(
            location.to_string(),
            format!("Coordinate ({}, {}) is outside WGS 84 range", lng, lat),
        );
    }

    result
}

fn validate_polygon(rings: &[Vec<[f64; 2]>]) -> ValidationResult {
    let mut result = ValidationResult::valid();

    if rings.is_empty() {
        result.add_error("Polygon".to_string(), "Polygon has no rings".to_string());
        return result;
    }

    for (i, ring) in rings.iter().enumerate() {
        let location = if i == 0 {
            "Polygon exterior".to_string()
        } else {
            format!("Polygon interior[{}]", i - 1)
        };
        if let Some(error) = ring_error(ring) {
            result.add_error(location, error);
        }
    }

    result
}

/// First problem found in a ring, if any
fn ring_error(ring: &[[f64; 2]]) -> Option<String> {
    for (i, coord) in ring.iter().enumerate() {
        if let Some(error) = validate_coord("", *coord).errors.into_iter().next() {
            return Some(format!("vertex {}: {}", i, error.reason));
        }
    }

    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if first == last => {}
        _ => return Some("Ring must be closed (first point == last point)".to_string()),
    }

    let vertices = dedup_consecutive(&ring[..ring.len() - 1]);
    let distinct = {
        let mut seen: Vec<[f64; 2]> = Vec::with_capacity(vertices.len());
        for v in &vertices {
            if !seen.contains(v) {
                seen.push(*v);
            }
        }
        seen.len()
    };
    if distinct < 3 {
        return Some(format!("Ring must have at least 3 distinct vertices, found {}", distinct));
    }

    if let Some((a, b)) = self_intersection(&vertices) {
        return Some(format!("Ring self-intersects between edges {} and {}", a, b));
    }

    None
}

/// Drop repeated consecutive vertices, including a repeat across the seam
fn dedup_consecutive(vertices: &[[f64; 2]]) -> Vec<[f64; 2]> {
    let mut out: Vec<[f64; 2]> = Vec::with_capacity(vertices.len());
    for v in vertices {
        if out.last() != Some(v) {
            out.push(*v);
        }
    }
    while out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out
}

/// Find a pair of crossing or overlapping edges in an open vertex list
/// (the closing edge is implied)
///
/// Edge envelopes go into an R-tree so only edges whose boxes touch are
/// compared exactly.
fn self_intersection(vertices: &[[f64; 2]]) -> Option<(usize, usize)> {
    let n = vertices.len();
    let segment = |i: usize| (vertices[i], vertices[(i + 1) % n]);
    let envelope = |i: usize| {
        let (a, b) = segment(i);
        AABB::from_corners(a, b)
    };
    let line = |i: usize| {
        let (a, b) = segment(i);
        Line::new(Coord { x: a[0], y: a[1] }, Coord { x: b[0], y: b[1] })
    };

    let tree = RTree::bulk_load(
        (0..n).map(|i| GeomWithData::new(Rectangle::from_aabb(envelope(i)), i)).collect(),
    );

    for i in 0..n {
        let hit = tree
            .locate_in_envelope_intersecting(&envelope(i))
            .map(|entry| entry.data)
            .filter(|&j| j > i)
            .filter(|&j| {
                let adjacent = j == i + 1 || (i == 0 && j == n - 1);
                match line_intersection(line(i), line(j)) {
                    None => false,
                    // Neighbours always share a vertex; only overlap counts
                    Some(LineIntersection::SinglePoint { .. }) => !adjacent,
                    Some(LineIntersection::Collinear { intersection }) => {
                        !adjacent || intersection.start != intersection.end
                    }
                }
            })
            .min();
        if let Some(j) = hit {
            return Some((i, j));
        }
    }

    None
}

/// Close open rings according to the validity mode
///
/// Lenient mode appends the first vertex to an open ring; strict mode
/// reports it.
pub fn close_rings(geometry: Geometry, mode: ValidityMode) -> Result<Geometry, ValidationError> {
    let close = |mut rings: Vec<Vec<[f64; 2]>>, location: &str| {
        for (i, ring) in rings.iter_mut().enumerate() {
            let open = match (ring.first(), ring.last()) {
                (Some(first), Some(last)) => first != last,
                _ => false,
            };
            if !open {
                continue;
            }
            match mode {
                ValidityMode::Lenient => {
                    let first = ring[0];
                    ring.push(first);
                }
                ValidityMode::Strict => {
                    return Err(ValidationError {
                        location: format!("{} ring[{}]", location, i),
                        reason: "Ring is not closed".to_string(),
                    });
                }
            }
        }
        Ok(rings)
    };

    match geometry {
        Geometry::Point { .. } => Ok(geometry),
        Geometry::Polygon { coordinates } => {
            Ok(Geometry::Polygon { coordinates: close(coordinates, "Polygon")? })
        }
        Geometry::MultiPolygon { coordinates } => Ok(Geometry::MultiPolygon {
            coordinates: coordinates
                .into_iter()
                .enumerate()
                .map(|(i, poly)| close(poly, &format!("MultiPolygon[{}]", i)))
                .collect::<Result<_, _>>()?,
        }),
    }
}

/// Close rings per `mode`, then validate
pub fn prepare_geometry(
    geometry: Geometry,
    mode: ValidityMode,
) -> Result<Geometry, ValidationError> {
    let geometry = close_rings(geometry, mode)?;
    let result = validate_geometry(&geometry);
    match result.errors.into_iter().next() {
        Some(error) => Err(error),
        None => Ok(geometry),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polygon(ring: &[[f64; 2]]) -> Geometry {
        Geometry::polygon(vec![ring.to_vec()])
    }

    #[test]
    fn test_valid_square() {
        let square = polygon(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]);
        assert!(validate_geometry(&square).is_valid);
    }

    #[test]
    fn test_bowtie_is_self_intersecting() {
        let bowtie = polygon(&[[0.0, 0.0], [1.0, 1.0], [1.0, 0.0], [0.0, 1.0], [0.0, 0.0]]);
        let result = validate_geometry(&bowtie);
        assert!(!result.is_valid);
        assert!(result.first_error().unwrap().reason.contains("self-intersects"));
    }

    #[test]
    fn test_too_few_distinct_vertices() {
        let sliver = polygon(&[[0.0, 0.0], [1.0, 0.0], [1.0, 0.0], [0.0, 0.0]]);
        let result = validate_geometry(&sliver);
        assert!(result.first_error().unwrap().reason.contains("3 distinct"));
    }

    #[test]
    fn test_collinear_spike_is_invalid() {
        let spike = polygon(&[[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [0.0, 0.0]]);
        assert!(!validate_geometry(&spike).is_valid);
    }

    #[test]
    fn test_out_of_range_coordinates() {
        let result = validate_geometry(&Geometry::point(200.0, 0.0));
        assert!(!result.is_valid);

        let result = validate_geometry(&Geometry::point(f64::NAN, 0.0));
        assert!(result.first_error().unwrap().reason.contains("finite"));
    }

    #[test]
    fn test_close_rings_lenient_and_strict() {
        let open = polygon(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]);

        let closed = close_rings(open.clone(), ValidityMode::Lenient).unwrap();
        assert_eq!(closed.coords().count(), 4);
        assert!(validate_geometry(&closed).is_valid);

        let err = close_rings(open, ValidityMode::Strict).unwrap_err();
        assert!(err.reason.contains("not closed"));
    }

    #[test]
    fn test_repeated_vertices_are_tolerated() {
        let ring = polygon(&[[0.0, 0.0], [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]);
        assert!(prepare_geometry(ring, ValidityMode::Strict).is_ok());
    }

    #[test]
    fn test_dense_ring_crossing_is_found() {
        let mut ring: Vec<[f64; 2]> = (0..5000)
            .map(|i| {
                let angle = f64::from(i) * std::f64::consts::TAU / 5000.0;
                [-40.3 + 0.01 * angle.cos(), -20.3 + 0.01 * angle.sin()]
            })
            .collect();
        ring.push(ring[0]);
        assert!(validate_geometry(&polygon(&ring)).is_valid);

        ring.swap(2500, 2501);
        let result = validate_geometry(&polygon(&ring));
        assert!(result.first_error().unwrap().reason.contains("self-intersects"));
    }
}
