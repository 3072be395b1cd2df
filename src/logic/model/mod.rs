//! Model Module - Training and Inference
//!
//! Forest training on smartcore, the immutable artifact it produces, and the scorer
//! that serves probabilities from it.

pub mod artifact;
pub mod config;
pub mod forest;
pub mod scorer;
pub mod trainer;

#[cfg(test)]
mod tests;

// Re-export common types
pub use artifact::{ModelArtifact, TrainingMetrics};
pub use config::{ImputationDefaults, ImputationStrategy, TrainerConfig};
pub use forest::RandomForest;
pub use scorer::{
    round2, ArtifactSlot, Confidence, ConfidenceLevel, ConfidencePolicy, Prediction, Scorer,
};
pub use trainer::ModelTrainer;
