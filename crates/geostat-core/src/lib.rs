//! Geostat Core - Domain models, tabular ingestion and configuration
//!
//! This crate contains the record types, the tabular readers and column
//! normalizer, and the layered configuration shared by the Geostat crates.

pub mod config;
pub mod error;
pub mod formats;
pub mod models;
pub mod normalize;

pub use error::{GeostatError, Result};
