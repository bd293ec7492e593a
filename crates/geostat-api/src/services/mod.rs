mod ingest;
mod query;

pub use ingest::IngestService;
pub use query::QueryService;
