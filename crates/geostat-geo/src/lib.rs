//! Geostat Geo - Geometry resolution, validation and spatial operations
//!
//! This crate turns raw coordinate fields into canonical geometry, checks
//! that geometry for validity, and provides the geodesic distance, spatial
//! index and extent computations used by radius queries.

pub mod distance;
pub mod extent;
pub mod index;
pub mod models;
pub mod resolve;
pub mod validation;

pub use distance::{distance_to_geometry, haversine_distance, EARTH_RADIUS_METERS};
pub use extent::extent;
pub use index::SpatialIndex;
pub use resolve::{resolve_listing_geometry, resolve_parcel_geometry, GeometryWarning};
