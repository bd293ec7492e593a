pub mod dataset;
pub mod geometry;
pub mod query;
pub mod record;
pub mod stats;

pub use dataset::DatasetKind;
pub use geometry::{Bounds, Geometry, ValidityMode};
pub use query::{AnalysisQuery, AnalysisResult, QueryPoint, DEFAULT_RADIUS_METERS};
pub use record::{Listing, Parcel, SpatialRecord};
pub use stats::{CollectionStats, DatasetStats, ListingStatistics, ParcelStatistics, Statistics};
