//! Format abstraction layer for tabular uploads
//!
//! Each supported upload format implements the `TabularReader` trait and
//! decodes raw bytes into a `Table` of named columns. The `FormatRegistry`
//! picks a reader from the file extension, falling back to content sniffing.

use serde_json::{Map, Value};

use crate::error::{GeostatError, Result};

pub mod csv;
pub mod geojson;
pub mod json;

/// Reader for one tabular upload format
pub trait TabularReader: Send + Sync {
    /// Decode the raw upload bytes into a table
    fn read(&self, bytes: &[u8]) -> Result<Table>;

    /// Get supported file extensions (e.g., ["csv", "txt"])
    fn supported_extensions(&self) -> &[&str];

    /// Get human-readable format name (e.g., "CSV", "GeoJSON")
    fn format_name(&self) -> &str;
}

/// Rows of named fields, as decoded from an upload
///
/// Every row has exactly one value per column; missing cells are `Null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    /// Build a table from JSON objects; columns are the union of keys in
    /// first-seen order
    pub fn from_objects(objects: Vec<Map<String, Value>>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for object in &objects {
            for key in object.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = objects
            .into_iter()
            .map(|mut object| {
                columns.iter().map(|c| object.remove(c).unwrap_or(Value::Null)).collect()
            })
            .collect();

        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Central registry for tabular readers
pub struct FormatRegistry {
    readers: Vec<Box<dyn TabularReader>>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self { readers: Vec::new() }
    }

    /// Register a reader
    pub fn register(&mut self, reader: Box<dyn TabularReader>) {
        self.readers.push(reader);
    }

    /// Find the reader registered under a format name
    pub fn by_name(&self, name: &str) -> Option<&dyn TabularReader> {
        self.readers
            .iter()
            .find(|r| r.format_name().eq_ignore_ascii_case(name))
            .map(|r| r.as_ref())
    }

    /// Pick the reader for an upload
    ///
    /// The extension decides, except that `.json` files holding a GeoJSON
    /// FeatureCollection go to the GeoJSON reader. Files without an
    /// extension are sniffed.
    pub fn detect(&self, filename: &str, bytes: &[u8]) -> Result<&dyn TabularReader> {
        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| !ext.is_empty() && !ext.contains('/'));

        let sniffed = sniff_format(bytes);

        if let Some(ext) = extension {
            let reader = self
                .readers
                .iter()
                .find(|r| r.supported_extensions().contains(&ext.as_str()))
                .ok_or_else(|| GeostatError::UnsupportedFormat { filename: filename.to_string() })?;

            if ext == "json" && sniffed == "GeoJSON" {
                if let Some(geojson) = self.by_name("GeoJSON") {
                    return Ok(geojson);
                }
            }
            return Ok(reader.as_ref());
        }

        self.by_name(sniffed)
            .ok_or_else(|| GeostatError::UnsupportedFormat { filename: filename.to_string() })
    }

    /// Detect the format and decode the upload
    pub fn read(&self, filename: &str, bytes: &[u8]) -> Result<Table> {
        let reader = self.detect(filename, bytes)?;
        tracing::debug!(filename, format = reader.format_name(), "Decoding upload");
        reader.read(bytes)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(csv::CsvReader));
        registry.register(Box::new(json::JsonReader));
        registry.register(Box::new(geojson::GeoJsonReader));
        registry
    }
}

/// Guess the format name from the first bytes of an upload
fn sniff_format(bytes: &[u8]) -> &'static str {
    let head = &bytes[..bytes.len().min(4096)];
    let text = String::from_utf8_lossy(strip_bom(head));
    let trimmed = text.trim_start();

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.contains("\"type\":\"FeatureCollection\"") {
            "GeoJSON"
        } else {
            "JSON"
        }
    } else {
        "CSV"
    }
}

/// Drop a leading UTF-8 byte order mark
pub(crate) fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(&[0xEF, 0xBB, 0xBF][..]).unwrap_or(bytes)
}
