//! Geostat Store - Collections, radius queries, statistics and export
//!
//! This crate holds the uploaded parcel and listing collections behind the
//! `SpatialStore` port, and implements ingestion, radius analysis,
//! aggregation and GeoJSON export on top of it.

pub mod aggregate;
pub mod collection;
pub mod export;
pub mod ingest;
pub mod memory;
pub mod ports;
pub mod query;

pub use collection::Collection;
pub use ingest::{ingest, IngestOptions, IngestReport};
pub use memory::MemoryStore;
pub use ports::SpatialStore;
pub use query::analyze;
