//! JSON records reader implementation

use serde_json::{Map, Value};

use crate::error::{GeostatError, Result};
use crate::formats::geojson::table_from_geojson;
use crate::formats::{strip_bom, Table, TabularReader};

/// Keys under which a wrapper object may hold its record array
const RECORD_KEYS: &[&str] = &["records", "data", "rows", "items"];

/// JSON reader
///
/// Accepts a top-level array of objects, an object wrapping such an array
/// under one of `RECORD_KEYS`, or newline-delimited JSON objects.
pub struct JsonReader;

impl TabularReader for JsonReader {
    fn read(&self, bytes: &[u8]) -> Result<Table> {
        let text = std::str::from_utf8(strip_bom(bytes))
            .map_err(|e| GeostatError::format("JSON", format!("Invalid UTF-8: {}", e)))?;

        if text.trim().is_empty() {
            return Err(GeostatError::format("JSON", "File is empty"));
        }

        match serde_json::from_str::<Value>(text) {
            Ok(value) => table_from_value(value),
            Err(whole_err) => read_ndjson(text).map_err(|_| {
                GeostatError::format("JSON", format!("Failed to parse JSON: {}", whole_err))
            }),
        }
    }

    fn supported_extensions(&self) -> &[&str] {
        &["json", "ndjson", "jsonl"]
    }

    fn format_name(&self) -> &str {
        "JSON"
    }
}

fn table_from_value(value: Value) -> Result<Table> {
    match value {
        Value::Array(items) => table_from_items(items),
        Value::Object(mut object) => {
            if object.get("type").and_then(Value::as_str) == Some("FeatureCollection") {
                return table_from_geojson(&Value::Object(object).to_string());
            }

            for key in RECORD_KEYS {
                if let Some(Value::Array(items)) = object.remove(*key) {
                    return table_from_items(items);
                }
            }

            // A single record
            Ok(Table::from_objects(vec![object]))
        }
        _ => Err(GeostatError::format("JSON", "Expected an array of objects")),
    }
}

fn table_from_items(items: Vec<Value>) -> Result<Table> {
    let objects = items
        .into_iter()
        .enumerate()
        .map(|(row, item)| match item {
            Value::Object(object) => Ok(object),
            other => Err(GeostatError::format(
                "JSON",
                format!("Row {} is not an object (found {})", row, type_name(&other)),
            )),
        })
        .collect::<Result<Vec<Map<String, Value>>>>()?;

    Ok(Table::from_objects(objects))
}

fn read_ndjson(text: &str) -> Result<Table> {
    let mut objects = Vec::new();
    for (row, line) in text.lines().filter(|l| !l.trim().is_empty()).enumerate() {
        match serde_json::from_str::<Value>(line)? {
            Value::Object(object) => objects.push(object),
            other => {
                return Err(GeostatError::format(
                    "JSON",
                    format!("Line {} is not an object (found {})", row, type_name(&other)),
                ))
            }
        }
    }
    Ok(Table::from_objects(objects))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_array_of_objects() {
        let data = r#"[
            {"Empreendimento": "Ed. Mar", "Preco Total": 300000, "latitude": -20.31, "longitude": -40.31},
            {"Empreendimento": "Ed. Sol", "Dormitorios": 3}
        ]"#;
        let table = JsonReader.read(data.as_bytes()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.columns,
            vec!["Empreendimento", "Preco Total", "latitude", "longitude", "Dormitorios"]
        );
        assert_eq!(table.rows[1][1], Value::Null);
    }

    #[test]
    fn test_read_wrapped_records() {
        let data = r#"{"records": [{"codLote": "1"}, {"codLote": "2"}]}"#;
        let table = JsonReader.read(data.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_read_ndjson() {
        let data = "{\"codLote\": \"1\"}\n{\"codLote\": \"2\"}\n";
        let table = JsonReader.read(data.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.columns, vec!["codLote"]);
    }

    #[test]
    fn test_rejects_scalar_rows() {
        let err = JsonReader.read(b"[1, 2]").unwrap_err();
        assert!(err.to_string().contains("Row 0"));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(JsonReader.read(b"not json at all").is_err());
        assert!(JsonReader.read(b"   ").is_err());
    }
}
