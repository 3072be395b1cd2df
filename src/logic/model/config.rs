//! Trainer Configuration
//!
//! Ensemble size, depth bound, split policy and imputation strategy.
//! Can be loaded from a config file or overridden from the environment.

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::logic::error::{EngineError, EngineResult};
use crate::logic::features::FEATURE_COUNT;

// ============================================================================
// DEFAULTS
// ============================================================================

pub use crate::constants::{DEFAULT_MAX_DEPTH, DEFAULT_MIN_ROWS, DEFAULT_N_TREES, DEFAULT_SEED};

pub const DEFAULT_MIN_SAMPLES_SPLIT: usize = 2;
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

// ============================================================================
// IMPUTATION
// ============================================================================

/// Per-feature values substituted for absent inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImputationDefaults {
    pub digital_score: f64,
    pub financial_activity: f64,
    pub engagement: f64,
    pub income_weight: f64,
    pub employment_score: f64,
}

impl ImputationDefaults {
    /// Midpoint profile (the operator form's starting values)
    pub fn neutral() -> Self {
        Self {
            digital_score: 1.0,
            financial_activity: 2.0,
            engagement: 1.0,
            income_weight: 0.5,
            employment_score: 0.5,
        }
    }

    pub fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        Self {
            digital_score: values[0],
            financial_activity: values[1],
            engagement: values[2],
            income_weight: values[3],
            employment_score: values[4],
        }
    }

    /// Values in layout order
    pub fn as_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.digital_score,
            self.financial_activity,
            self.engagement,
            self.income_weight,
            self.employment_score,
        ]
    }
}

impl Default for ImputationDefaults {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Where the imputation defaults come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "defaults", rename_all = "snake_case")]
pub enum ImputationStrategy {
    /// Median of each column over the training partition
    TrainingMedian,
    /// Fixed values, independent of the data
    Fixed(ImputationDefaults),
}

impl Default for ImputationStrategy {
    fn default() -> Self {
        ImputationStrategy::TrainingMedian
    }
}

// ============================================================================
// TRAINER CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Number of trees in the ensemble
    pub n_trees: usize,
    /// Maximum depth of every tree (root = depth 0)
    pub max_depth: usize,
    /// Nodes with fewer samples become leaves
    pub min_samples_split: usize,
    /// Features sampled per split; `None` means floor(sqrt(FEATURE_COUNT))
    pub max_features: Option<usize>,
    /// Share of rows held out from fitting
    pub test_fraction: f64,
    /// Seed for the split, bootstrap draws and feature sampling
    pub seed: u64,
    /// Minimum labeled rows accepted by `fit`
    pub min_rows: usize,
    pub imputation: ImputationStrategy,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            n_trees: DEFAULT_N_TREES,
            max_depth: DEFAULT_MAX_DEPTH,
            min_samples_split: DEFAULT_MIN_SAMPLES_SPLIT,
            max_features: None,
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: DEFAULT_SEED,
            min_rows: DEFAULT_MIN_ROWS,
            imputation: ImputationStrategy::default(),
        }
    }
}

impl TrainerConfig {
    /// Defaults, then `ANTON_*` environment overrides
    pub fn from_env() -> Self {
        Self {
            n_trees: constants::get_n_trees(),
            max_depth: constants::get_max_depth(),
            seed: constants::get_seed(),
            min_rows: constants::get_min_rows(),
            ..Default::default()
        }
    }

    /// Small ensemble for tests and quick experiments
    pub fn quick() -> Self {
        Self {
            n_trees: 15,
            max_depth: 4,
            ..Default::default()
        }
    }

    /// Reject settings the forest cannot be grown with
    pub fn validate(&self) -> EngineResult<()> {
        if self.n_trees == 0 {
            return Err(EngineError::Config("n_trees must be at least 1".to_string()));
        }
        if self.max_depth == 0 || self.max_depth > u16::MAX as usize {
            return Err(EngineError::Config(format!(
                "max_depth {} must be in 1..={}",
                self.max_depth,
                u16::MAX
            )));
        }
        if self.min_samples_split < 2 {
            return Err(EngineError::Config(format!(
                "min_samples_split {} must be at least 2",
                self.min_samples_split
            )));
        }
        if !(0.0..1.0).contains(&self.test_fraction) {
            return Err(EngineError::Config(format!(
                "test_fraction {} must be in [0, 1)",
                self.test_fraction
            )));
        }
        Ok(())
    }

    /// Resolved per-split feature budget
    pub fn features_per_split(&self) -> usize {
        self.max_features
            .unwrap_or_else(|| (FEATURE_COUNT as f64).sqrt().floor() as usize)
            .clamp(1, FEATURE_COUNT)
    }
}

// ============================================================================
// TESTS
// ============================================================================
