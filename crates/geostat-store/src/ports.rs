use std::sync::Arc;

use geostat_core::models::{Bounds, DatasetStats, Listing, Parcel};

use crate::collection::Collection;

/// Port for the parcel and listing collections
///
/// Collections are replaced whole. Readers get an `Arc` snapshot that stays
/// consistent for as long as they hold it, whatever replacements happen
/// meanwhile.
pub trait SpatialStore: Send + Sync {
    /// Swap in a new parcel collection
    fn replace_parcels(&self, parcels: Collection<Parcel>);

    /// Swap in a new listing collection
    fn replace_listings(&self, listings: Collection<Listing>);

    /// Current parcel snapshot
    fn parcels(&self) -> Arc<Collection<Parcel>>;

    /// Current listing snapshot
    fn listings(&self) -> Arc<Collection<Listing>>;

    /// Counters for both collections
    fn stats(&self) -> DatasetStats {
        DatasetStats { lotes: self.parcels().stats(), imoveis: self.listings().stats() }
    }

    /// Extent of every record with geometry, across both collections
    fn bounds(&self) -> Option<Bounds> {
        match (self.parcels().bounds(), self.listings().bounds()) {
            (Some(a), Some(b)) => Some(a.merge(&b)),
            (a, b) => a.or(b),
        }
    }
}
