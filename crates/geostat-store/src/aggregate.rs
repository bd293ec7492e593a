//! Statistics over a matched subset
//!
//! Absent values are left out of both numerator and denominator. A metric
//! with no contributing record is omitted, so no result is ever NaN.

use std::collections::{BTreeMap, HashSet};

use geostat_core::models::{Listing, ListingStatistics, Parcel, ParcelStatistics};

/// Count, sum and range of the values present
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
}

impl Summary {
    /// Summarize the present values; `None` when there are none
    pub fn of(values: impl IntoIterator<Item = Option<f64>>) -> Option<Self> {
        values.into_iter().flatten().fold(None, |acc, v| {
            Some(match acc {
                None => Summary { count: 1, sum: v, min: v, max: v },
                Some(s) => Summary {
                    count: s.count + 1,
                    sum: s.sum + v,
                    min: s.min.min(v),
                    max: s.max.max(v),
                },
            })
        })
    }

    pub fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

fn distribution(
    keys: impl IntoIterator<Item = Option<String>>,
) -> Option<BTreeMap<String, usize>> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for key in keys.into_iter().flatten() {
        *counts.entry(key).or_default() += 1;
    }
    (!counts.is_empty()).then_some(counts)
}

/// Land-area statistics and neighborhood breakdown for matched parcels
pub fn parcel_statistics(parcels: &[&Parcel]) -> ParcelStatistics {
    let area = Summary::of(parcels.iter().map(|p| p.land_area));

    let neighborhoods = || {
        parcels
            .iter()
            .filter_map(|p| p.neighborhood.as_deref())
            .map(str::trim)
            .filter(|n| !n.is_empty())
    };
    let distinct: HashSet<&str> = neighborhoods().collect();

    ParcelStatistics {
        area_media: area.map(|s| s.mean()),
        area_total: area.map(|s| s.sum),
        area_min: area.map(|s| s.min),
        area_max: area.map(|s| s.max),
        bairros_unicos: (!distinct.is_empty()).then_some(distinct.len()),
        distribuicao_bairros: distribution(neighborhoods().map(|n| Some(n.to_string()))),
    }
}

/// Price and area statistics and bedroom breakdown for matched listings
pub fn listing_statistics(listings: &[&Listing]) -> ListingStatistics {
    let price = Summary::of(listings.iter().map(|l| l.total_price));
    let area = Summary::of(listings.iter().map(|l| l.private_area));

    ListingStatistics {
        preco_medio: price.map(|s| s.mean()),
        preco_min: price.map(|s| s.min),
        preco_max: price.map(|s| s.max),
        metragem_media: area.map(|s| s.mean()),
        distribuicao_dormitorios: distribution(
            listings.iter().map(|l| l.bedrooms.map(|b| b.to_string())),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parcel(area: Option<f64>, bairro: Option<&str>) -> Parcel {
        Parcel {
            land_area: area,
            neighborhood: bairro.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_absent_area_is_not_zero() {
        let parcels = [
            parcel(Some(500.0), Some("Centro")),
            parcel(None, Some("Centro")),
            parcel(Some(300.0), Some("Bento Ferreira")),
        ];
        let refs: Vec<&Parcel> = parcels.iter().collect();
        let stats = parcel_statistics(&refs);

        assert_eq!(stats.area_total, Some(800.0));
        assert_eq!(stats.area_media, Some(400.0));
        assert_eq!(stats.area_min, Some(300.0));
        assert_eq!(stats.area_max, Some(500.0));
        assert_eq!(stats.bairros_unicos, Some(2));

        let distribution = stats.distribuicao_bairros.unwrap();
        assert_eq!(distribution["Centro"], 2);
        assert_eq!(distribution["Bento Ferreira"], 1);
    }

    #[test]
    fn test_no_area_omits_area_keys() {
        let parcels = [parcel(None, None)];
        let refs: Vec<&Parcel> = parcels.iter().collect();
        let stats = parcel_statistics(&refs);

        assert_eq!(stats, ParcelStatistics::default());
        assert_eq!(serde_json::to_value(&stats).unwrap(), serde_json::json!({}));
    }

    #[test]
    fn test_listing_statistics() {
        let listings = [
            Listing {
                total_price: Some(300000.0),
                private_area: Some(80.0),
                bedrooms: Some(2),
                ..Default::default()
            },
            Listing { total_price: Some(500000.0), bedrooms: Some(3), ..Default::default() },
            Listing { bedrooms: Some(2), ..Default::default() },
        ];
        let refs: Vec<&Listing> = listings.iter().collect();
        let stats = listing_statistics(&refs);

        assert_eq!(stats.preco_medio, Some(400000.0));
        assert_eq!(stats.preco_min, Some(300000.0));
        assert_eq!(stats.preco_max, Some(500000.0));
        assert_eq!(stats.metragem_media, Some(80.0));

        let bedrooms = stats.distribuicao_dormitorios.unwrap();
        assert_eq!(bedrooms["2"], 2);
        assert_eq!(bedrooms["3"], 1);
    }

    #[test]
    fn test_empty_subset() {
        assert_eq!(listing_statistics(&[]), ListingStatistics::default());
        assert_eq!(parcel_statistics(&[]), ParcelStatistics::default());
        assert!(Summary::of(Vec::new()).is_none());
    }
}
