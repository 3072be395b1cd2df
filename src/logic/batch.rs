//! Batch scoring over JSONL rows or CSV tables
//!
//! Feature columns are read by name, every other column passes through
//! untouched and the score columns are appended. Output order matches input;
//! CSV output also keeps the input header order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::dataset::{CsvTable, JsonRow, ScoreSink};
use super::engine::ScoringEngine;
use super::error::{EngineError, EngineResult};
use super::features::{FeatureInput, FeatureVector, FEATURE_COUNT, FEATURE_LAYOUT};

pub const SCORE_COLUMN: &str = "anton_score";
pub const BAND_COLUMN: &str = "risk_band";
pub const EXPLANATION_COLUMN: &str = "explanation";
pub const CONFIDENCE_COLUMN: &str = "confidence";

/// Appended to every scored row, in this order
pub const SCORE_COLUMNS: [&str; 4] = [SCORE_COLUMN, BAND_COLUMN, EXPLANATION_COLUMN, CONFIDENCE_COLUMN];

const REASON_SEPARATOR: &str = "; ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchMode {
    /// Every row carries all five feature columns
    Strict,
    /// Any subset; absent columns are imputed
    #[default]
    Adaptive,
}

impl ScoringEngine {
    pub fn score_rows(&self, rows: &[JsonRow], mode: BatchMode) -> EngineResult<Vec<JsonRow>> {
        self.score_rows_with(rows, mode, None)
    }

    /// Like `score_rows`, with one log record per row
    pub fn score_rows_logged(
        &self,
        rows: &[JsonRow],
        mode: BatchMode,
        sink: &dyn ScoreSink,
    ) -> EngineResult<Vec<JsonRow>> {
        self.score_rows_with(rows, mode, Some(sink))
    }

    /// Score a CSV table; the score columns follow the input headers
    pub fn score_table(
        &self,
        table: &CsvTable,
        mode: BatchMode,
        sink: Option<&dyn ScoreSink>,
    ) -> EngineResult<CsvTable> {
        Ok(CsvTable {
            headers: output_headers(&table.headers),
            rows: self.score_rows_with(&table.rows, mode, sink)?,
        })
    }

    fn score_rows_with(
        &self,
        rows: &[JsonRow],
        mode: BatchMode,
        sink: Option<&dyn ScoreSink>,
    ) -> EngineResult<Vec<JsonRow>> {
        let mut out = Vec::with_capacity(rows.len());

        for (index, row) in rows.iter().enumerate() {
            let input = input_from_row(index, row, mode)?;
            let result = match sink {
                Some(sink) => self.evaluate_logged(&input, sink)?,
                None => self.evaluate(&input)?,
            };

            let mut scored = row.clone();
            scored.insert(SCORE_COLUMN.to_string(), Value::from(result.probability));
            scored.insert(BAND_COLUMN.to_string(), Value::from(result.band.as_str()));
            scored.insert(
                EXPLANATION_COLUMN.to_string(),
                Value::from(result.reasons.join(REASON_SEPARATOR)),
            );
            scored.insert(
                CONFIDENCE_COLUMN.to_string(),
                Value::from(result.confidence.level.as_str()),
            );
            out.push(scored);
        }

        log::info!("Scored {} rows ({:?} mode)", out.len(), mode);
        Ok(out)
    }
}

/// Input headers, then any score column not already among them
pub fn output_headers(headers: &[String]) -> Vec<String> {
    let mut out = headers.to_vec();
    for column in SCORE_COLUMNS {
        if !out.iter().any(|h| h == column) {
            out.push(column.to_string());
        }
    }
    out
}

/// Read the feature columns of one row; other columns are ignored
pub fn input_from_row(index: usize, row: &JsonRow, mode: BatchMode) -> EngineResult<FeatureInput> {
    let mut supplied = BTreeMap::new();
    for name in FEATURE_LAYOUT {
        if let Some(value) = cell_value(index, name, row.get(*name))? {
            supplied.insert(name.to_string(), value);
        }
    }

    match mode {
        BatchMode::Adaptive => Ok(FeatureInput::Partial(supplied)),
        BatchMode::Strict => {
            let mut values = [0.0; FEATURE_COUNT];
            for (slot, name) in values.iter_mut().zip(FEATURE_LAYOUT) {
                *slot = *supplied
                    .get(*name)
                    .ok_or_else(|| EngineError::missing_at(*name, index))?;
            }
            Ok(FeatureInput::Strict(FeatureVector::from_array(values)))
        }
    }
}

/// null, "" and missing cells are absent; numeric strings are accepted
fn cell_value(row: usize, column: &str, cell: Option<&Value>) -> EngineResult<Option<f64>> {
    let invalid = |reason: String| EngineError::InvalidValue {
        row,
        column: column.to_string(),
        reason,
    };

    match cell {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| invalid(format!("{} is not representable as f64", n))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => match s.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(invalid(format!("`{}` is not a number", s))),
        },
        Some(other) => Err(invalid(format!("expected a number, found {}", other))),
    }
}
