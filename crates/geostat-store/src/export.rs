//! GeoJSON export of stored records

use geojson::{Feature, FeatureCollection};

use geostat_core::models::{Geometry, SpatialRecord};

use crate::collection::Collection;

/// Convert a geometry to its `geojson` form
pub fn to_geojson_geometry(geometry: &Geometry) -> geojson::Geometry {
    let ring = |ring: &Vec<[f64; 2]>| ring.iter().map(|c| c.to_vec()).collect::<Vec<_>>();

    let value = match geometry {
        Geometry::Point { coordinates } => geojson::Value::Point(coordinates.to_vec()),
        Geometry::Polygon { coordinates } => {
            geojson::Value::Polygon(coordinates.iter().map(ring).collect())
        }
        Geometry::MultiPolygon { coordinates } => geojson::Value::MultiPolygon(
            coordinates.iter().map(|poly| poly.iter().map(ring).collect()).collect(),
        ),
    };

    geojson::Geometry::new(value)
}

/// One feature for a record, or `None` when it has no geometry
pub fn to_feature<T: SpatialRecord>(record: &T) -> Option<Feature> {
    let geometry = record.geometry()?;

    Some(Feature {
        bbox: None,
        geometry: Some(to_geojson_geometry(geometry)),
        id: None,
        properties: Some(record.properties()),
        foreign_members: None,
    })
}

/// Features for the records with geometry, in input order, keeping at most
/// `limit` of them (`0` keeps all)
pub fn to_features<'a, T: SpatialRecord>(
    records: impl IntoIterator<Item = &'a T>,
    limit: usize,
) -> Vec<Feature> {
    let features = records.into_iter().filter_map(to_feature);
    if limit == 0 {
        features.collect()
    } else {
        features.take(limit).collect()
    }
}

/// Wrap [`to_features`] in a feature collection
pub fn to_feature_collection<'a, T: SpatialRecord>(
    records: impl IntoIterator<Item = &'a T>,
    limit: usize,
) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: to_features(records, limit),
        foreign_members: None,
    }
}

/// Export a collection, optionally narrowed to one neighborhood
pub fn export_collection<T: SpatialRecord>(
    collection: &Collection<T>,
    neighborhood: Option<&str>,
    limit: usize,
) -> FeatureCollection {
    match neighborhood.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => to_feature_collection(collection.filter_by_neighborhood(name), limit),
        None => to_feature_collection(collection.all(), limit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geostat_core::models::{Listing, Parcel};
    use serde_json::json;

    fn parcel(code: &str, geometry: Option<Geometry>) -> Parcel {
        Parcel {
            code: Some(code.to_string()),
            land_area: Some(500.0),
            geometry,
            ..Default::default()
        }
    }

    fn square() -> Geometry {
        Geometry::polygon(vec![vec![
            [-40.301, -20.301],
            [-40.299, -20.301],
            [-40.299, -20.299],
            [-40.301, -20.301],
        ]])
    }

    #[test]
    fn test_records_without_geometry_are_skipped() {
        let parcels =
            vec![parcel("1", Some(square())), parcel("2", None), parcel("3", Some(square()))];
        let collection = to_feature_collection(&parcels, 0);

        let codes: Vec<_> = collection
            .features
            .iter()
            .map(|f| f.property("codLote").cloned().unwrap())
            .collect();
        assert_eq!(codes, vec![json!("1"), json!("3")]);
    }

    #[test]
    fn test_limit_applies_after_filtering() {
        let parcels =
            vec![parcel("1", None), parcel("2", Some(square())), parcel("3", Some(square()))];
        let features = to_features(&parcels, 1);

        assert_eq!(features.len(), 1);
        assert_eq!(features[0].property("codLote"), Some(&json!("2")));
    }

    #[test]
    fn test_export_collection_by_neighborhood() {
        let mut centro = parcel("1", Some(square()));
        centro.neighborhood = Some("Centro".to_string());
        let mut praia = parcel("2", Some(square()));
        praia.neighborhood = Some("Praia do Canto".to_string());
        let collection = Collection::new(vec![centro, praia]);

        assert_eq!(export_collection(&collection, Some(" centro"), 0).features.len(), 1);
        assert_eq!(export_collection(&collection, Some(""), 0).features.len(), 2);
        assert_eq!(export_collection(&collection, None, 1).features.len(), 1);
    }

    #[test]
    fn test_feature_json_shape() {
        let listing = Listing {
            name: Some("Ed. Mar".to_string()),
            total_price: Some(300000.0),
            geometry: Some(Geometry::point(-40.31, -20.31)),
            ..Default::default()
        };

        let value = serde_json::to_value(to_feature(&listing).unwrap()).unwrap();
        assert_eq!(value["type"], "Feature");
        assert_eq!(value["geometry"], json!({"type": "Point", "coordinates": [-40.31, -20.31]}));
        assert_eq!(
            value["properties"],
            json!({"empreendimento": "Ed. Mar", "preco_total": 300000.0})
        );
    }
}
