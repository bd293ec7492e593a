//! In-memory storage for the uploaded collections.
//!
//! Each collection sits behind a lock that is only held long enough to
//! clone or swap an `Arc`. A poisoned lock still guards a complete snapshot,
//! so poisoning is ignored rather than propagated.

use std::sync::{Arc, PoisonError, RwLock};

use geostat_core::models::{Listing, Parcel};

use crate::collection::Collection;
use crate::ports::SpatialStore;

/// In-memory implementation of SpatialStore
#[derive(Debug, Default)]
pub struct MemoryStore {
    parcels: RwLock<Arc<Collection<Parcel>>>,
    listings: RwLock<Arc<Collection<Listing>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

fn snapshot<T>(slot: &RwLock<Arc<Collection<T>>>) -> Arc<Collection<T>> {
    Arc::clone(&slot.read().unwrap_or_else(PoisonError::into_inner))
}

fn swap<T>(slot: &RwLock<Arc<Collection<T>>>, collection: Collection<T>) {
    // Built before taking the lock; writers only hold it for the swap
    let collection = Arc::new(collection);
    *slot.write().unwrap_or_else(PoisonError::into_inner) = collection;
}

impl SpatialStore for MemoryStore {
    fn replace_parcels(&self, parcels: Collection<Parcel>) {
        swap(&self.parcels, parcels);
    }

    fn replace_listings(&self, listings: Collection<Listing>) {
        swap(&self.listings, listings);
    }

    fn parcels(&self) -> Arc<Collection<Parcel>> {
        snapshot(&self.parcels)
    }

    fn listings(&self) -> Arc<Collection<Listing>> {
        snapshot(&self.listings)
    }
}
