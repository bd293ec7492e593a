mod analyze;
mod datasets;
mod export;
mod health;
mod upload;

pub use analyze::analyze_area;
pub use datasets::{get_bounds, get_stats};
pub use export::{imoveis_geojson, lotes_geojson};
pub use health::health_check;
pub use upload::{upload_imoveis, upload_lotes};
