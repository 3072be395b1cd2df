//! CSV tables for batch scoring and training input.
//!
//! Cells are read as strings into the same `JsonRow` shape the JSONL path
//! uses; the header list keeps the column order for writing back.

use std::fs::{self, File};
use std::path::Path;

use serde_json::Value;

use super::export::JsonRow;
use crate::logic::error::EngineResult;
use crate::logic::features::RawRecord;

/// Rows of one CSV file plus its header order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<JsonRow>,
}

impl CsvTable {
    /// Headers are the row keys in first-seen order
    pub fn from_rows(rows: Vec<JsonRow>) -> Self {
        let mut headers: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
        }
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// `.csv` extension, any case
pub fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("csv"))
}

pub fn read_csv_rows(path: &Path) -> EngineResult<CsvTable> {
    let mut reader = csv::Reader::from_reader(File::open(path)?);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: JsonRow = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.clone(), Value::from(cell)))
            .collect();
        rows.push(row);
    }

    log::debug!("Read {} CSV rows from {:?}", rows.len(), path);
    Ok(CsvTable { headers, rows })
}

/// Write `table` with its header order; absent or null cells are blank
pub fn write_csv_rows(path: &Path, table: &CsvTable) -> EngineResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(table.headers.iter().map(|h| cell_text(row.get(h))))?;
    }
    writer.flush()?;
    Ok(())
}

/// Survey records from a CSV export; blank cells become `None`
pub fn load_raw_records_csv(path: &Path) -> EngineResult<Vec<RawRecord>> {
    let mut reader = csv::Reader::from_reader(File::open(path)?);
    let mut records = Vec::new();
    for record in reader.deserialize::<RawRecord>() {
        records.push(record?);
    }
    Ok(records)
}

fn cell_text(cell: Option<&Value>) -> String {
    match cell {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
