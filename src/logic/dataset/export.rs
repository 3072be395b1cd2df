//! JSONL files on disk: survey records for training, row files for batch
//! scoring, and merging of rotated score logs. CSV lives in `table`.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde_json::{Map, Value};

use super::table::{is_csv, load_raw_records_csv};
use super::writer::is_log_file;
use crate::logic::error::{EngineError, EngineResult};
use crate::logic::features::RawRecord;

/// One batch row: column name → cell
pub type JsonRow = Map<String, Value>;

/// Read one JSON object per non-blank line
pub fn read_jsonl_rows(path: &Path) -> EngineResult<Vec<JsonRow>> {
    read_lines(path, |line, index| match serde_json::from_str::<Value>(line)? {
        Value::Object(row) => Ok(row),
        other => Err(EngineError::InvalidValue {
            row: index,
            column: String::new(),
            reason: format!("expected a JSON object, found {}", kind(&other)),
        }),
    })
}

pub fn write_jsonl_rows(path: &Path, rows: &[JsonRow]) -> EngineResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut out = BufWriter::new(File::create(path)?);
    for row in rows {
        serde_json::to_writer(&mut out, row)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

/// Survey records for training from JSONL or `.csv`; blank cells become `None`
pub fn load_raw_records(path: &Path) -> EngineResult<Vec<RawRecord>> {
    let records = if is_csv(path) {
        load_raw_records_csv(path)?
    } else {
        read_lines(path, |line, _| Ok(serde_json::from_str::<RawRecord>(line)?))?
    };
    log::info!("Loaded {} raw records from {:?}", records.len(), path);
    Ok(records)
}

/// Concatenate every rotated score log in `source_dir` into `target`.
/// Returns the number of files merged.
pub fn export_logs(source_dir: &Path, target: &Path) -> EngineResult<usize> {
    let mut paths: Vec<_> = fs::read_dir(source_dir)?
        .filter_map(|r| r.ok())
        .map(|e| e.path())
        .filter(|p| is_log_file(p))
        .collect();

    // Chronological by file name
    paths.sort();

    let mut output = File::create(target)?;
    for path in &paths {
        let content = fs::read(path)?;
        output.write_all(&content)?;
        if content.last().map_or(false, |&b| b != b'\n') {
            output.write_all(b"\n")?;
        }
    }

    output.flush()?;
    log::info!("Exported {} score log files to {:?}", paths.len(), target);
    Ok(paths.len())
}

fn read_lines<T>(
    path: &Path,
    mut parse: impl FnMut(&str, usize) -> EngineResult<T>,
) -> EngineResult<Vec<T>> {
    let reader = BufReader::new(File::open(path)?);
    let mut out = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let index = out.len();
        out.push(parse(line, index)?);
    }
    Ok(out)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
