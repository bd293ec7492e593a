use crate::models::{Bounds, Geometry};

/// Smallest box covering every vertex of the given geometries
///
/// Returns `None` when there is no geometry at all.
pub fn extent<'a>(geometries: impl IntoIterator<Item = &'a Geometry>) -> Option<Bounds> {
    geometries
        .into_iter()
        .filter_map(Geometry::bounds)
        .reduce(|acc, bounds| acc.merge(&bounds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_over_points_and_polygons() {
        let geometries = [
            Geometry::point(-40.31, -20.31),
            Geometry::polygon(vec![vec![
                [-40.301, -20.301],
                [-40.299, -20.301],
                [-40.299, -20.299],
                [-40.301, -20.301],
            ]]),
        ];

        let bounds = extent(&geometries).unwrap();
        assert_eq!(bounds.min_lng, -40.31);
        assert_eq!(bounds.min_lat, -20.31);
        assert_eq!(bounds.max_lng, -40.299);
        assert_eq!(bounds.max_lat, -20.299);
    }

    #[test]
    fn test_empty_extent() {
        assert!(extent(std::iter::empty()).is_none());
    }
}
