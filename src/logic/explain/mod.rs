//! Explain Module - Reason strings for a score
//!
//! Fixed threshold heuristics over the input features. They are evaluated
//! independently of the forest and say nothing about how the model reached
//! its probability, nor about how reliable that probability is.

pub mod engine;
pub mod types;

pub use engine::Explainer;
pub use types::{Comparison, ExplanationRule};
