//! Random Forest - bagged ensemble on smartcore
//!
//! smartcore's forest only reports the majority class, so every tree is
//! fitted as its own one-tree `RandomForestClassifier`. smartcore still does
//! the bootstrap draw, the per-split feature sampling and the Gini splits;
//! the ensemble probability is the share of trees voting for label 1.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_classifier::SplitCriterion;

use super::config::TrainerConfig;
use crate::logic::error::EngineResult;

type Member = RandomForestClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>;

#[derive(Serialize, Deserialize)]
pub struct RandomForest {
    members: Vec<Member>,
    n_features: usize,
}

impl RandomForest {
    /// Fit `config.n_trees` trees on `x`/`y`; tree seeds are drawn from `config.seed`
    pub fn fit(x: &DenseMatrix<f64>, y: &Vec<i32>, config: &TrainerConfig) -> EngineResult<Self> {
        let (_, n_features) = x.shape();
        let mut rng = StdRng::seed_from_u64(config.seed);

        let mut members = Vec::with_capacity(config.n_trees);
        for _ in 0..config.n_trees {
            let params = RandomForestClassifierParameters::default()
                .with_criterion(SplitCriterion::Gini)
                .with_n_trees(1)
                .with_max_depth(config.max_depth.min(u16::MAX as usize) as u16)
                .with_min_samples_split(config.min_samples_split.max(2))
                .with_m(config.features_per_split())
                .with_seed(rng.gen());
            members.push(RandomForestClassifier::fit(x, y, params)?);
        }

        Ok(Self {
            members,
            n_features,
        })
    }

    /// Positive-class probability for one row in training column order
    pub fn predict_proba(&self, row: &[f64]) -> EngineResult<f64> {
        let x = DenseMatrix::from_2d_vec(&vec![row.to_vec()]);
        Ok(self.predict_matrix(&x)?.first().copied().unwrap_or(0.0))
    }

    /// Vote share for label 1, one entry per row of `x`
    pub fn predict_matrix(&self, x: &DenseMatrix<f64>) -> EngineResult<Vec<f64>> {
        let (n_rows, _) = x.shape();
        if self.members.is_empty() {
            return Ok(vec![0.0; n_rows]);
        }

        let mut votes = vec![0usize; n_rows];
        for member in &self.members {
            let labels = member.predict(x)?;
            for (count, label) in votes.iter_mut().zip(labels) {
                if label == 1 {
                    *count += 1;
                }
            }
        }

        let n_trees = self.members.len() as f64;
        Ok(votes.into_iter().map(|v| v as f64 / n_trees).collect())
    }

    pub fn n_trees(&self) -> usize {
        self.members.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn is_well_formed(&self) -> bool {
        !self.members.is_empty() && self.n_features > 0
    }
}

impl fmt::Debug for RandomForest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomForest")
            .field("n_trees", &self.members.len())
            .field("n_features", &self.n_features)
            .finish()
    }
}

// Two forests are equal when they serialize to the same trees
impl PartialEq for RandomForest {
    fn eq(&self, other: &Self) -> bool {
        self.n_features == other.n_features
            && self.members.len() == other.members.len()
            && matches!(
                (serde_json::to_value(&self.members), serde_json::to_value(&other.members)),
                (Ok(a), Ok(b)) if a == b
            )
    }
}

// ============================================================================
// TESTS
// ============================================================================
