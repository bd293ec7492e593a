use std::collections::HashSet;

use geostat_core::models::{Bounds, CollectionStats, SpatialRecord};
use geostat_core::normalize::fold_text;
use geostat_geo::{distance_to_geometry, extent, SpatialIndex};

/// An immutable snapshot of one uploaded dataset
///
/// The spatial index, counters and extent are built with the records and
/// never change afterwards.
#[derive(Debug)]
pub struct Collection<T> {
    records: Vec<T>,
    index: SpatialIndex,
    columns: Vec<String>,
    stats: CollectionStats,
    bounds: Option<Bounds>,
}

impl<T: SpatialRecord> Collection<T> {
    /// Build a collection; exposed columns are the property keys of the
    /// records in first-seen order
    pub fn new(records: Vec<T>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            for key in record.properties().keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
        Self::with_columns(records, columns)
    }

    /// Build a collection with the column list of its upload
    pub fn with_columns(records: Vec<T>, columns: Vec<String>) -> Self {
        let index = SpatialIndex::from_geometries(
            records.iter().enumerate().filter_map(|(id, r)| r.geometry().map(|g| (id, g))),
        );

        let neighborhoods: HashSet<&str> = records
            .iter()
            .filter_map(|r| r.neighborhood())
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .collect();

        let stats = CollectionStats {
            total: records.len(),
            com_geometria: index.len(),
            bairros_unicos: neighborhoods.len(),
        };
        let bounds = extent(records.iter().filter_map(|r| r.geometry()));

        Self { records, index, columns, stats, bounds }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every record, in upload order
    pub fn all(&self) -> &[T] {
        &self.records
    }

    /// Columns of the upload this collection came from
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Whether the upload exposed a property under `key`
    pub fn has_column(&self, key: &str) -> bool {
        self.columns.iter().any(|c| c == key)
    }

    /// Records whose neighborhood matches `name`, ignoring case, accents
    /// and surrounding whitespace
    pub fn filter_by_neighborhood(&self, name: &str) -> Vec<&T> {
        let wanted = fold_text(name);
        self.records
            .iter()
            .filter(|r| r.neighborhood().is_some_and(|n| fold_text(n) == wanted))
            .collect()
    }

    /// Records within `radius_meters` of `center` (`[lng, lat]`), in upload
    /// order
    pub fn within_radius(&self, center: [f64; 2], radius_meters: f64) -> Vec<&T> {
        self.index
            .candidates_within(center, radius_meters)
            .into_iter()
            .map(|id| &self.records[id])
            .filter(|r| Self::matches(*r, center, radius_meters))
            .collect()
    }

    /// Same as [`within_radius`](Self::within_radius), checking every record
    pub fn within_radius_exhaustive(&self, center: [f64; 2], radius_meters: f64) -> Vec<&T> {
        self.records.iter().filter(|r| Self::matches(*r, center, radius_meters)).collect()
    }

    fn matches(record: &T, center: [f64; 2], radius_meters: f64) -> bool {
        record
            .geometry()
            .is_some_and(|g| distance_to_geometry(center, g) <= radius_meters)
    }

    pub fn stats(&self) -> CollectionStats {
        self.stats
    }

    /// Extent of the records with geometry
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            index: SpatialIndex::new(),
            columns: Vec::new(),
            stats: CollectionStats::default(),
            bounds: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geostat_core::models::{Geometry, Listing, Parcel};

    fn listing(name: &str, bairro: &str, geometry: Option<Geometry>) -> Listing {
        Listing {
            name: Some(name.to_string()),
            neighborhood: Some(bairro.to_string()),
            geometry,
            ..Default::default()
        }
    }

    #[test]
    fn test_counters() {
        let collection = Collection::new(vec![
            listing("a", "Centro", Some(Geometry::point(-40.31, -20.31))),
            listing("b", " Centro ", None),
            listing("c", "Praia do Canto", Some(Geometry::point(-40.29, -20.29))),
        ]);

        let stats = collection.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.com_geometria, 2);
        assert_eq!(stats.bairros_unicos, 2);

        let bounds = collection.bounds().unwrap();
        assert_eq!(bounds.min_lng, -40.31);
        assert_eq!(bounds.max_lat, -20.29);
    }

    #[test]
    fn test_filter_by_neighborhood_folds_text() {
        let collection = Collection::new(vec![
            listing("a", "Jardim Camburí", None),
            listing("b", "Centro", None),
            listing("c", "jardim  camburi", None),
        ]);

        let names: Vec<_> = collection
            .filter_by_neighborhood("  JARDIM CAMBURI ")
            .iter()
            .map(|l| l.name.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn test_within_radius_keeps_upload_order_and_skips_missing_geometry() {
        let collection = Collection::new(vec![
            listing("far", "x", Some(Geometry::point(-40.0, -20.0))),
            listing("near2", "x", Some(Geometry::point(-40.3001, -20.3))),
            listing("none", "x", None),
            listing("near1", "x", Some(Geometry::point(-40.3, -20.3001))),
        ]);

        let found: Vec<_> = collection
            .within_radius([-40.3, -20.3], 100.0)
            .iter()
            .map(|l| l.name.clone().unwrap())
            .collect();
        assert_eq!(found, vec!["near2", "near1"]);
    }

    #[test]
    fn test_columns() {
        let parcel = Parcel {
            code: Some("1".to_string()),
            land_area: Some(10.0),
            ..Default::default()
        };
        let collection = Collection::new(vec![parcel]);
        assert!(collection.has_column("codLote"));
        assert!(collection.has_column("area_terreno"));
        assert!(!collection.has_column("bairro"));

        let empty: Collection<Parcel> = Collection::default();
        assert!(empty.is_empty());
        assert!(empty.bounds().is_none());
        assert_eq!(empty.stats(), CollectionStats::default());
    }
}
