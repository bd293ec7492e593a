//! Integration tests: uploads through radius analysis and export

use geostat_core::models::{AnalysisQuery, DatasetKind, Geometry, Listing, Parcel};
use geostat_store::export::to_feature_collection;
use geostat_store::{analyze, ingest, Collection, IngestOptions, MemoryStore, SpatialStore};
use proptest::prelude::*;
use serde_json::json;

const MAX_RADIUS: f64 = 5000.0;

const PARCELS_GEOJSON: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": {"codLote": "L-1", "Bairro": "Centro", "Área Terreno": 500, "inscricao": "77"},
      "geometry": {
        "type": "Polygon",
        "coordinates": [[[-40.3005, -20.3005], [-40.2995, -20.3005], [-40.2995, -20.2995], [-40.3005, -20.2995], [-40.3005, -20.3005]]]
      }
    },
    {
      "type": "Feature",
      "properties": {"codLote": "L-2", "Bairro": "Centro", "Área Terreno": 250},
      "geometry": null
    }
  ]
}"#;

const LISTINGS_CSV: &str = "Empreendimento;Bairro;Preco Total;Metragem Privativa;Dormitorios;Latitude;Longitude\n\
Ed. Mar;Praia do Canto;300000;80;2;-20.31;-40.31\n\
Ed. Longe;Jardim Camburi;900000;120;3;-20.25;-40.25\n";

fn loaded_store() -> MemoryStore {
    let store = MemoryStore::new();
    let options = IngestOptions::default();
    ingest(&store, DatasetKind::Lotes, "lotes.geojson", PARCELS_GEOJSON.as_bytes(), options)
        .unwrap();
    ingest(&store, DatasetKind::Imoveis, "imoveis.csv", LISTINGS_CSV.as_bytes(), options)
        .unwrap();
    store
}

#[test]
fn test_end_to_end_radius_analysis() {
    let store = loaded_store();

    let result =
        analyze(&store, &AnalysisQuery::new(-20.305, -40.305, 2000.0), MAX_RADIUS).unwrap();

    assert_eq!(result.lotes_encontrados, 1);
    assert_eq!(result.imoveis_encontrados, 1);
    assert_eq!(result.estatisticas.lotes.area_media, Some(500.0));
    assert_eq!(result.estatisticas.lotes.area_total, Some(500.0));
    assert_eq!(result.estatisticas.imoveis.preco_medio, Some(300000.0));
    assert_eq!(result.estatisticas.imoveis.metragem_media, Some(80.0));

    let body = serde_json::to_value(&result).unwrap();
    assert_eq!(body["point"], json!({"latitude": -20.305, "longitude": -40.305}));
    assert_eq!(body["radius_meters"], json!(2000.0));
    assert_eq!(body["lotes"][0]["properties"]["codLote"], json!("L-1"));
    assert_eq!(body["lotes"][0]["properties"]["inscricao"], json!("77"));
    assert_eq!(body["imoveis"][0]["properties"]["empreendimento"], json!("Ed. Mar"));
}

#[test]
fn test_tiny_radius_far_away_is_empty() {
    let store = loaded_store();

    let result = analyze(&store, &AnalysisQuery::new(10.0, 10.0, 1.0), MAX_RADIUS).unwrap();

    assert_eq!(result.lotes_encontrados, 0);
    assert_eq!(result.imoveis_encontrados, 0);
    assert!(result.estatisticas.is_empty());
    assert!(result.lotes.is_empty() && result.imoveis.is_empty());
}

#[test]
fn test_empty_store_is_not_an_error() {
    let store = MemoryStore::new();
    let result = analyze(&store, &AnalysisQuery::new(-20.3, -40.3, 500.0), MAX_RADIUS).unwrap();
    assert_eq!(result.lotes_encontrados + result.imoveis_encontrados, 0);
}

#[test]
fn test_invalid_query_is_rejected() {
    let store = loaded_store();
    let err =
        analyze(&store, &AnalysisQuery::new(-20.3, -40.3, 6000.0), MAX_RADIUS).unwrap_err();
    assert_eq!(err.field(), Some("radius_meters"));
}

#[test]
fn test_filters_apply_only_where_the_column_exists() {
    let store = loaded_store();

    let query = AnalysisQuery::new(-20.28, -40.28, 5000.0).with_filter("dormitorios", 3);
    let result = analyze(&store, &query, MAX_RADIUS).unwrap();

    // Parcels have no bedroom column, so the filter leaves them alone
    assert_eq!(result.lotes_encontrados, 1);
    assert_eq!(result.imoveis_encontrados, 1);
    assert_eq!(result.imoveis[0].property("empreendimento"), Some(&json!("Ed. Longe")));
}

#[test]
fn test_coordinate_filters_match_and_geometry_filters_are_ignored() {
    let store = loaded_store();

    let query = AnalysisQuery::new(-20.31, -40.31, 100.0);
    let unfiltered = analyze(&store, &query, MAX_RADIUS).unwrap();
    let filtered =
        analyze(&store, &query.clone().with_filter("latitude", -20.31), MAX_RADIUS).unwrap();

    assert_eq!(unfiltered.imoveis_encontrados, 1);
    assert_eq!(filtered.imoveis_encontrados, 1);
    assert_eq!(filtered.imoveis[0].property("longitude"), Some(&json!(-40.31)));

    // The parcel upload has a geometry column, but geometry is not a property
    let query = AnalysisQuery::new(-20.31, -40.31, 3000.0).with_filter("geometry", "x");
    let result = analyze(&store, &query, MAX_RADIUS).unwrap();
    assert_eq!(result.lotes_encontrados, 1);
    assert_eq!(result.imoveis_encontrados, 1);
}

#[test]
fn test_unresolved_geometry_is_counted_but_never_matched_or_exported() {
    let store = loaded_store();
    let parcels = store.parcels();

    assert_eq!(parcels.stats().total, 2);
    assert_eq!(parcels.stats().com_geometria, 1);

    let exported = to_feature_collection(parcels.all(), 0);
    assert_eq!(exported.features.len(), 1);

    let result =
        analyze(&store, &AnalysisQuery::new(-20.30, -40.30, 5000.0), MAX_RADIUS).unwrap();
    assert_eq!(result.lotes_encontrados, 1);
}

#[test]
fn test_replacing_one_collection_leaves_the_other() {
    let store = loaded_store();
    let parcels_before = store.parcels();
    let stats_before = store.stats().lotes;

    store.replace_listings(Collection::new(vec![Listing {
        name: Some("Novo".to_string()),
        ..Default::default()
    }]));

    assert_eq!(store.stats().lotes, stats_before);
    assert_eq!(store.parcels().all(), parcels_before.all());
    assert_eq!(store.stats().imoveis.total, 1);
    assert_eq!(store.stats().imoveis.com_geometria, 0);
}

#[test]
fn test_bounds_cover_both_collections() {
    let store = loaded_store();
    let bounds = store.bounds().unwrap();

    assert_eq!(bounds.min_lng, -40.31);
    assert_eq!(bounds.min_lat, -20.31);
    assert_eq!(bounds.max_lng, -40.25);
    assert_eq!(bounds.max_lat, -20.25);
}

#[test]
fn test_export_round_trips_geometry() {
    let store = loaded_store();
    let parcels = store.parcels();

    let exported = to_feature_collection(parcels.all(), 0);
    let geometry = exported.features[0].geometry.as_ref().unwrap();
    let value = serde_json::to_value(geometry).unwrap();

    assert_eq!(Geometry::from_geojson(&value).as_ref(), parcels.all()[0].geometry.as_ref());
}

fn scattered_parcels(offsets: &[(f64, f64, bool)]) -> Collection<Parcel> {
    Collection::new(
        offsets
            .iter()
            .enumerate()
            .map(|(i, (dlng, dlat, has_geometry))| {
                let (lng, lat) = (-40.3 + dlng, -20.3 + dlat);
                Parcel {
                    code: Some(i.to_string()),
                    geometry: has_geometry.then(|| {
                        Geometry::polygon(vec![vec![
                            [lng, lat],
                            [lng + 0.001, lat],
                            [lng + 0.001, lat + 0.001],
                            [lng, lat + 0.001],
                            [lng, lat],
                        ]])
                    }),
                    ..Default::default()
                }
            })
            .collect(),
    )
}

fn scattered_listings(offsets: &[(f64, f64, bool)]) -> Collection<Listing> {
    Collection::new(
        offsets
            .iter()
            .map(|(dlng, dlat, has_geometry)| Listing {
                total_price: Some(100000.0),
                geometry: has_geometry.then(|| Geometry::point(-40.3 - dlng, -20.3 - dlat)),
                ..Default::default()
            })
            .collect(),
    )
}

proptest! {
    #[test]
    fn prop_larger_radius_never_finds_less(
        offsets in prop::collection::vec((-0.05f64..0.05, -0.05f64..0.05, any::<bool>()), 0..40),
        lat in -20.35f64..-20.25,
        lng in -40.35f64..-40.25,
        r1 in 1.0f64..5000.0,
        extra in 0.0f64..5000.0,
    ) {
        let store = MemoryStore::new();
        store.replace_parcels(scattered_parcels(&offsets));
        store.replace_listings(scattered_listings(&offsets));

        let r2 = (r1 + extra).min(MAX_RADIUS);
        let small = analyze(&store, &AnalysisQuery::new(lat, lng, r1), MAX_RADIUS).unwrap();
        let large = analyze(&store, &AnalysisQuery::new(lat, lng, r2), MAX_RADIUS).unwrap();

        prop_assert!(large.lotes_encontrados >= small.lotes_encontrados);
        prop_assert!(large.imoveis_encontrados >= small.imoveis_encontrados);
    }

    #[test]
    fn prop_indexed_query_equals_exhaustive_scan(
        offsets in prop::collection::vec((-0.05f64..0.05, -0.05f64..0.05, any::<bool>()), 0..40),
        lat in -20.35f64..-20.25,
        lng in -40.35f64..-40.25,
        radius in 1.0f64..8000.0,
    ) {
        let collection = scattered_parcels(&offsets);
        prop_assert_eq!(
            collection.within_radius([lng, lat], radius),
            collection.within_radius_exhaustive([lng, lat], radius)
        );
    }
}
