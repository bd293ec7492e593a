use std::sync::Arc;

use geostat_core::config::LayeredConfig;
use geostat_store::{IngestOptions, MemoryStore, SpatialStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SpatialStore>,
    pub config: Arc<LayeredConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn SpatialStore>, config: LayeredConfig) -> Self {
        Self { store, config: Arc::new(config) }
    }

    /// State backed by an empty in-memory store
    pub fn in_memory(config: LayeredConfig) -> Self {
        Self::new(Arc::new(MemoryStore::new()), config)
    }

    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions::from(self.config.as_ref())
    }

    pub fn max_radius_meters(&self) -> f64 {
        self.config.max_radius_meters.value
    }

    pub fn default_radius_meters(&self) -> f64 {
        self.config.default_radius_meters.value
    }

    pub fn feature_limit(&self) -> usize {
        self.config.feature_limit.value
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.config.max_upload_bytes.value
    }
}
