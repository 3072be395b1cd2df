//! Features Module - Feature Derivation
//!
//! Turns survey rows into the five canonical scoring features and defines
//! the input shapes the scorer accepts.

pub mod layout;
pub mod raw;
pub mod vector;


// Re-export common types
pub use layout::{feature_index, feature_name, LayoutInfo, FEATURE_COUNT, FEATURE_LAYOUT};
pub use raw::{Derivation, EngineerConfig, FeatureEngineer, RawRecord, TrainingSet};
pub use vector::{FeatureInput, FeatureVector, ObservedFeatures};
