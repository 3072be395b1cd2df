//! Anton - behavioral credit scoring for thin-file borrowers
//!
//! Derives five behavioral features from survey data, trains a bagged
//! decision-tree ensemble on them and scores complete or partial profiles
//! into a probability, a confidence level, a risk band and plain-language
//! reasons.

pub mod constants;
pub mod logic;

pub use logic::batch::BatchMode;
pub use logic::config::EngineConfig;
pub use logic::engine::{ScoreResponse, ScoreResult, ScoringEngine};
pub use logic::error::{EngineError, EngineResult};
pub use logic::features::{FeatureEngineer, FeatureInput, FeatureVector, RawRecord};
pub use logic::model::{ModelArtifact, ModelTrainer, TrainerConfig};
pub use logic::risk::RiskBand;
