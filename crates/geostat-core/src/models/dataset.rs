use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GeostatError;

/// The two dataset kinds the engine holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    /// Land parcels ("lotes"), polygon geometry
    Lotes,
    /// Real-estate listings ("imoveis"), point geometry
    Imoveis,
}

impl DatasetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Lotes => "lotes",
            DatasetKind::Imoveis => "imoveis",
        }
    }

    /// Human-readable label used in upload messages
    pub fn label(&self) -> &'static str {
        match self {
            DatasetKind::Lotes => "Lotes",
            DatasetKind::Imoveis => "Imóveis",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetKind {
    type Err = GeostatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lotes" | "lote" | "parcels" | "parcel" => Ok(DatasetKind::Lotes),
            "imoveis" | "imóveis" | "imovel" | "imóvel" | "listings" | "listing" => {
                Ok(DatasetKind::Imoveis)
            }
            other => Err(GeostatError::validation(
                "file_type",
                other,
                "expected 'lotes' or 'imoveis'",
            )),
        }
    }
}
