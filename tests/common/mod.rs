//! Synthetic survey data shared by the integration tests

#![allow(dead_code)]

use std::sync::{Arc, OnceLock};

use anton_scoring::logic::model::TrainerConfig;
use anton_scoring::{FeatureEngineer, ModelArtifact, ModelTrainer, RawRecord, ScoringEngine};

fn bit(i: usize, k: usize) -> Option<f64> {
    Some(((i >> k) & 1) as f64)
}

/// 1024 complete survey rows covering every yes/no combination
pub fn survey() -> Vec<RawRecord> {
    (0..1024)
        .map(|i| RawRecord {
            mobileowner: bit(i, 0),
            pay_onlne: bit(i, 1),
            pay_cash: bit(i, 2),
            saved: bit(i, 3),
            borrowed: bit(i, 4),
            receive_wages: bit(i, 5),
            pay_utilities: bit(i, 6),
            receive_transfers: bit(i, 7),
            receive_pension: bit(i, 8),
            receive_agriculture: bit(i, 9),
            inc_q: Some((1 + (i / 7) % 4) as f64),
            emp_in: Some((1 + (i / 11) % 4) as f64),
        })
        .collect()
}

pub fn quick_config() -> TrainerConfig {
    TrainerConfig {
        n_trees: 20,
        ..TrainerConfig::quick()
    }
}

pub fn train(config: TrainerConfig) -> ModelArtifact {
    ModelTrainer::new(config)
        .fit_records(&FeatureEngineer::default(), &survey())
        .expect("survey trains")
}

/// One engine per test binary; training is the slow part
pub fn shared_engine() -> &'static ScoringEngine {
    static ENGINE: OnceLock<ScoringEngine> = OnceLock::new();
    ENGINE.get_or_init(|| {
        ScoringEngine::with_artifact(Arc::new(train(quick_config()))).expect("artifact attaches")
    })
}
