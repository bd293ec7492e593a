use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Dashboard counters for one collection, independent of any query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionStats {
    /// Rows uploaded, resolvable geometry or not
    pub total: usize,
    pub com_geometria: usize,
    /// Distinct non-empty neighborhood names
    pub bairros_unicos: usize,
}

/// Counters for both collections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetStats {
    pub lotes: CollectionStats,
    pub imoveis: CollectionStats,
}

/// Aggregates over matched parcels
///
/// A metric is omitted when no matched record contributes to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParcelStatistics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_media: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bairros_unicos: Option<usize>,
    /// Neighborhood name to number of matched parcels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribuicao_bairros: Option<BTreeMap<String, usize>>,
}

/// Aggregates over matched listings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingStatistics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preco_medio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preco_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preco_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metragem_media: Option<f64>,
    /// Bedroom count to number of matched listings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribuicao_dormitorios: Option<BTreeMap<String, usize>>,
}

/// Per-query statistics keyed by collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub lotes: ParcelStatistics,
    pub imoveis: ListingStatistics,
}

impl Statistics {
    pub fn is_empty(&self) -> bool {
        self.lotes == ParcelStatistics::default() && self.imoveis == ListingStatistics::default()
    }
}
