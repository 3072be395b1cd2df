//! Engine errors
//!
//! Every failure the scoring engine can report. All of them are recoverable
//! by the caller; a transport layer maps them onto its own responses.

use thiserror::Error;

use crate::logic::features::layout::LayoutMismatchError;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Training input too small or degenerate
    #[error("insufficient training data: {0}")]
    InsufficientData(String),

    /// Strict scoring with an absent feature; batch scoring also names the row
    #[error("missing feature: {feature}{}", .row.map(|r| format!(" (row {})", r)).unwrap_or_default())]
    MissingFeature { feature: String, row: Option<usize> },

    /// Unknown feature name or artifact/layout disagreement
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("no model artifact attached")]
    ModelNotLoaded,

    /// Raw survey record lacks a field the derivation needs
    #[error("raw record is missing required field `{field}`")]
    IncompleteRecord { field: &'static str },

    /// Batch cell that cannot be read as a number
    #[error("row {row}, column `{column}`: {reason}")]
    InvalidValue {
        row: usize,
        column: String,
        reason: String,
    },

    /// smartcore refused to fit or predict
    #[error("model error: {0}")]
    Model(String),

    /// Configuration file with inconsistent values
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
}

impl EngineError {
    pub fn missing(feature: impl Into<String>) -> Self {
        EngineError::MissingFeature {
            feature: feature.into(),
            row: None,
        }
    }

    /// Missing feature in a batch row
    pub fn missing_at(feature: impl Into<String>, row: usize) -> Self {
        EngineError::MissingFeature {
            feature: feature.into(),
            row: Some(row),
        }
    }

    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            EngineError::Io(_) | EngineError::ModelNotLoaded | EngineError::Model(_)
        )
    }
}

impl From<LayoutMismatchError> for EngineError {
    fn from(err: LayoutMismatchError) -> Self {
        EngineError::SchemaMismatch(err.to_string())
    }
}

impl From<smartcore::error::Failed> for EngineError {
    fn from(err: smartcore::error::Failed) -> Self {
        EngineError::Model(err.to_string())
    }
}
