//! Upload ingestion: decode, normalize, resolve geometry, replace
//!
//! An upload either replaces its collection whole or leaves the store
//! untouched. Rows with unusable geometry are kept and reported as
//! warnings.

use geostat_core::config::LayeredConfig;
use geostat_core::formats::FormatRegistry;
use geostat_core::models::{DatasetKind, Geometry, Listing, Parcel, SpatialRecord, ValidityMode};
use geostat_core::normalize::{normalize_table, NormalizedRow, NormalizedTable};
use geostat_core::{GeostatError, Result};
use geostat_geo::{resolve_listing_geometry, resolve_parcel_geometry, GeometryWarning};

use crate::collection::Collection;
use crate::ports::SpatialStore;

/// Settings applied to every upload
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IngestOptions {
    pub validity: ValidityMode,
    /// Largest accepted upload in bytes (0 = no limit)
    pub max_upload_bytes: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self::from(&LayeredConfig::default())
    }
}

impl From<&LayeredConfig> for IngestOptions {
    fn from(config: &LayeredConfig) -> Self {
        Self {
            validity: config.geometry_validity.value,
            max_upload_bytes: config.max_upload_bytes.value,
        }
    }
}

/// Outcome of a successful upload
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    pub kind: DatasetKind,
    /// Rows uploaded, with or without geometry
    pub records_count: usize,
    pub with_geometry: usize,
    /// Canonical and extra column names, in source order
    pub columns: Vec<String>,
    pub format: String,
    pub warnings: Vec<GeometryWarning>,
}

impl IngestReport {
    /// Confirmation message for the caller
    pub fn message(&self) -> String {
        format!("{} carregados com sucesso", self.kind.label())
    }
}

type Resolver = fn(&NormalizedRow, ValidityMode) -> std::result::Result<Geometry, GeometryWarning>;

/// Turn normalized rows into records, collecting geometry warnings
pub fn build_records<T: SpatialRecord>(
    table: &NormalizedTable,
    validity: ValidityMode,
    resolve: Resolver,
    make: fn(&NormalizedRow, Option<Geometry>) -> T,
) -> (Vec<T>, Vec<GeometryWarning>) {
    let mut warnings = Vec::new();
    let records = table
        .rows
        .iter()
        .map(|row| {
            let geometry = match resolve(row, validity) {
                Ok(geometry) => Some(geometry),
                Err(warning) => {
                    tracing::debug!(
                        kind = %table.kind,
                        row = warning.row,
                        reason = %warning.reason,
                        "Row has no usable geometry"
                    );
                    warnings.push(warning);
                    None
                }
            };
            make(row, geometry)
        })
        .collect();

    (records, warnings)
}

/// Decode an upload and replace the matching collection
///
/// Fails without touching the store when the upload is too large, cannot
/// be decoded, or has no identifying or geometry column.
pub fn ingest<S: SpatialStore + ?Sized>(
    store: &S,
    kind: DatasetKind,
    filename: &str,
    bytes: &[u8],
    options: IngestOptions,
) -> Result<IngestReport> {
    if options.max_upload_bytes > 0 && bytes.len() > options.max_upload_bytes {
        return Err(GeostatError::UploadTooLarge {
            size: bytes.len(),
            limit: options.max_upload_bytes,
        });
    }

    let registry = FormatRegistry::default();
    let reader = registry.detect(filename, bytes)?;
    let format = reader.format_name().to_string();
    let table = reader.read(bytes)?;
    let normalized = normalize_table(kind, table)?;
    let columns = normalized.columns.clone();

    let (with_geometry, warnings) = match kind {
        DatasetKind::Lotes => {
            let (records, warnings) = build_records(
                &normalized,
                options.validity,
                resolve_parcel_geometry,
                Parcel::from_row,
            );
            let collection = Collection::with_columns(records, columns.clone());
            let with_geometry = collection.stats().com_geometria;
            store.replace_parcels(collection);
            (with_geometry, warnings)
        }
        DatasetKind::Imoveis => {
            let (records, warnings) = build_records(
                &normalized,
                options.validity,
                resolve_listing_geometry,
                Listing::from_row,
            );
            let collection = Collection::with_columns(records, columns.clone());
            let with_geometry = collection.stats().com_geometria;
            store.replace_listings(collection);
            (with_geometry, warnings)
        }
    };

    tracing::info!(
        kind = %kind,
        filename,
        format = %format,
        records = normalized.len(),
        with_geometry,
        unresolved = warnings.len(),
        "Dataset replaced"
    );

    Ok(IngestReport {
        kind,
        records_count: normalized.len(),
        with_geometry,
        columns,
        format,
        warnings,
    })
}
