//! Shared synthetic training data for unit tests

use crate::logic::features::FeatureVector;
use crate::logic::model::{ModelArtifact, ModelTrainer, TrainerConfig};

/// Every combination of plausible feature values; label = financial_activity >= 3
pub fn grid() -> (Vec<FeatureVector>, Vec<f64>) {
    let mut features = Vec::new();
    let mut labels = Vec::new();

    for digital in 0..=3 {
        for financial in 0..=4 {
            for engagement in 0..=3 {
                for income in [0.25, 0.5, 0.75, 1.0] {
                    for employment in [0.2, 0.5, 0.8, 1.0] {
                        features.push(FeatureVector::new(
                            digital as f64,
                            financial as f64,
                            engagement as f64,
                            income,
                            employment,
                        ));
                        labels.push(if financial >= 3 { 1.0 } else { 0.0 });
                    }
                }
            }
        }
    }

    (features, labels)
}

pub fn trained(config: TrainerConfig) -> ModelArtifact {
    let (features, labels) = grid();
    ModelTrainer::new(config)
        .fit(&features, &labels)
        .expect("grid data trains")
}
