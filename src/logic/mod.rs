//! Logic Module - Scoring engine
//!
//! ## Architecture
//! - `features/` - Survey rows → the five scoring features, input shapes
//! - `model/` - Forest training, artifacts, scoring with imputation
//! - `explain/` - Threshold reasons
//! - `risk/` - Probability → risk band
//! - `dataset/` - Score logs, JSONL and CSV files
//! - `engine` / `batch` - Facade over all of the above

pub mod batch;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod explain;
pub mod features;
pub mod model;
pub mod risk;

#[cfg(test)]
pub(crate) mod fixtures;
