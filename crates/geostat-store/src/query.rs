//! Radius analysis over both collections

use serde_json::{Map, Value};

use geostat_core::models::{AnalysisQuery, AnalysisResult, SpatialRecord, Statistics};
use geostat_core::normalize::{fields, fold_text};
use geostat_core::Result;

use crate::aggregate::{listing_statistics, parcel_statistics};
use crate::collection::Collection;
use crate::export::to_features;
use crate::ports::SpatialStore;

/// Find the parcels and listings within the query radius and summarize them
///
/// The query is validated first; nothing is clamped. An empty store yields
/// zero matches and empty statistics.
pub fn analyze<S: SpatialStore + ?Sized>(
    store: &S,
    query: &AnalysisQuery,
    max_radius_meters: f64,
) -> Result<AnalysisResult> {
    query.validate(max_radius_meters)?;

    let center = [query.longitude, query.latitude];
    let parcels = store.parcels();
    let listings = store.listings();

    let lotes = matching(&parcels, center, query);
    let imoveis = matching(&listings, center, query);

    tracing::info!(
        latitude = query.latitude,
        longitude = query.longitude,
        radius_meters = query.radius_meters,
        filters = query.filters.len(),
        lotes = lotes.len(),
        imoveis = imoveis.len(),
        "Radius analysis complete"
    );

    Ok(AnalysisResult {
        point: query.point(),
        radius_meters: query.radius_meters,
        lotes_encontrados: lotes.len(),
        imoveis_encontrados: imoveis.len(),
        estatisticas: Statistics {
            lotes: parcel_statistics(&lotes),
            imoveis: listing_statistics(&imoveis),
        },
        lotes: to_features(lotes.iter().copied(), 0),
        imoveis: to_features(imoveis.iter().copied(), 0),
    })
}

fn matching<'a, T: SpatialRecord>(
    collection: &'a Collection<T>,
    center: [f64; 2],
    query: &AnalysisQuery,
) -> Vec<&'a T> {
    let found = collection.within_radius(center, query.radius_meters);
    apply_filters(collection, found, &query.filters)
}

/// Filter equality: numbers compare by value, text ignoring case and
/// accents
fn value_matches(value: &Value, wanted: &Value) -> bool {
    match (value, wanted) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::String(a), Value::String(b)) => fold_text(a) == fold_text(b),
        (Value::Number(a), Value::String(b)) | (Value::String(b), Value::Number(a)) => {
            b.trim().parse::<f64>().ok() == a.as_f64()
        }
        (a, b) => a == b,
    }
}

/// Geometry encodings are consumed by resolution and never exported as
/// properties, so they cannot be filtered on
const UNFILTERABLE_COLUMNS: &[&str] = &[fields::GEOMETRY, fields::VERTICES];

/// Records of one collection that pass `filters`, ignoring keys the
/// collection does not expose
pub fn apply_filters<'a, T: SpatialRecord>(
    collection: &'a Collection<T>,
    records: Vec<&'a T>,
    filters: &Map<String, Value>,
) -> Vec<&'a T> {
    let applicable: Vec<(&String, &Value)> = filters
        .iter()
        .filter(|(key, _)| {
            collection.has_column(key) && !UNFILTERABLE_COLUMNS.contains(&key.as_str())
        })
        .collect();
    if applicable.is_empty() {
        return records;
    }

    records
        .into_iter()
        .filter(|record| {
            let properties = record.properties();
            applicable.iter().all(|(key, wanted)| {
                properties.get(key.as_str()).is_some_and(|value| value_matches(value, wanted))
            })
        })
        .collect()
}
