//! CSV format reader implementation

use serde_json::Value;

use crate::error::{GeostatError, Result};
use crate::formats::{strip_bom, Table, TabularReader};

/// CSV reader; the delimiter (`,`, `;` or tab) is sniffed from the header line
pub struct CsvReader;

impl TabularReader for CsvReader {
    fn read(&self, bytes: &[u8]) -> Result<Table> {
        let bytes = strip_bom(bytes);
        let delimiter = sniff_delimiter(bytes);

        let mut reader = ::csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(bytes);

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| GeostatError::format("CSV", format!("Failed to read header: {}", e)))?
            .iter()
            .map(|h| h.trim().to_owned())
            .collect();

        if columns.iter().all(|c| c.is_empty()) {
            return Err(GeostatError::format("CSV", "File contains no header row"));
        }

        let mut table = Table::new(columns);

        for (row, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                GeostatError::format("CSV", format!("Failed to read row {}: {}", row, e))
            })?;

            let values = (0..table.columns.len())
                .map(|i| match record.get(i).map(str::trim) {
                    Some(v) if !v.is_empty() => Value::String(v.to_owned()),
                    _ => Value::Null,
                })
                .collect();
            table.rows.push(values);
        }

        Ok(table)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["csv", "tsv", "txt"]
    }

    fn format_name(&self) -> &str {
        "CSV"
    }
}

/// Pick the most frequent candidate delimiter in the header line
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let header = bytes.split(|b| *b == b'\n').next().unwrap_or_default();

    let mut in_quotes = false;
    let mut counts = [0usize; 3];
    for byte in header {
        match byte {
            b'"' => in_quotes = !in_quotes,
            b',' if !in_quotes => counts[0] += 1,
            b';' if !in_quotes => counts[1] += 1,
            b'\t' if !in_quotes => counts[2] += 1,
            _ => {}
        }
    }

    if counts[1] > counts[0] && counts[1] >= counts[2] {
        b';'
    } else if counts[2] > counts[0] {
        b'\t'
    } else {
        b','
    }
}
