//! Model Trainer
//!
//! One-shot offline fit: validate the labeled rows, split 80/20 with
//! smartcore's seeded splitter, grow the forest on the training partition
//! and score the holdout.
//! Identical input ordering and configuration give an identical forest.

use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::model_selection::train_test_split;

use super::artifact::{ModelArtifact, TrainingMetrics};
use super::config::{ImputationDefaults, ImputationStrategy, TrainerConfig};
use super::forest::RandomForest;
use crate::logic::error::{EngineError, EngineResult};
use crate::logic::features::{FeatureEngineer, FeatureVector, RawRecord, FEATURE_COUNT, FEATURE_LAYOUT};

#[derive(Debug, Clone, Default)]
pub struct ModelTrainer {
    config: TrainerConfig,
}

impl ModelTrainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Fit on already-derived feature rows. Labels must be 0 or 1.
    pub fn fit(&self, features: &[FeatureVector], labels: &[f64]) -> EngineResult<ModelArtifact> {
        self.config.validate()?;
        self.check_inputs(features, labels)?;

        let n = features.len();
        let rows: Vec<Vec<f64>> = features.iter().map(|f| f.as_array().to_vec()).collect();
        let x = DenseMatrix::from_2d_vec(&rows);
        let y: Vec<i32> = labels.iter().map(|&l| l as i32).collect();

        let n_test = holdout_size(n, self.config.test_fraction);
        if n - n_test < 2 {
            return Err(EngineError::InsufficientData(format!(
                "test_fraction {} leaves {} training rows out of {}",
                self.config.test_fraction,
                n - n_test,
                n
            )));
        }

        let (x_train, holdout, y_train) = if n_test == 0 {
            (x, None, y)
        } else {
            let (x_train, x_test, y_train, y_test) = train_test_split(
                &x,
                &y,
                self.config.test_fraction as f32,
                true,
                Some(self.config.seed),
            );
            (x_train, Some((x_test, y_test)), y_train)
        };

        log::info!(
            "Training forest: {} trees, max depth {}, {} train / {} holdout rows",
            self.config.n_trees,
            self.config.max_depth,
            y_train.len(),
            n_test
        );

        let forest = RandomForest::fit(&x_train, &y_train, &self.config)?;

        let imputation = match &self.config.imputation {
            ImputationStrategy::TrainingMedian => column_medians(&x_train),
            ImputationStrategy::Fixed(defaults) => *defaults,
        };

        let (holdout_rows, holdout_accuracy) = match &holdout {
            Some((x_test, y_test)) => {
                let correct = forest
                    .predict_matrix(x_test)?
                    .iter()
                    .zip(y_test)
                    .filter(|(p, label)| (**p >= 0.5) == (**label == 1))
                    .count();
                (y_test.len(), Some(correct as f64 / y_test.len() as f64))
            }
            None => (0, None),
        };

        let positives = y_train.iter().filter(|&&l| l == 1).count();
        let metrics = TrainingMetrics {
            train_rows: y_train.len(),
            holdout_rows,
            holdout_accuracy,
            positive_rate: positives as f64 / y_train.len() as f64,
            dropped_rows: 0,
            unmapped_employment: 0,
        };

        match metrics.holdout_accuracy {
            Some(acc) => log::info!("Holdout accuracy: {:.3}", acc),
            None => log::info!("No holdout rows; accuracy not measured"),
        }

        ModelArtifact::new(forest, imputation, self.config.clone(), metrics)
    }

    /// Derive survey rows, drop incomplete ones, label by `borrowed`, then fit
    pub fn fit_records(
        &self,
        engineer: &FeatureEngineer,
        records: &[RawRecord],
    ) -> EngineResult<ModelArtifact> {
        let set = engineer.prepare(records);
        let mut artifact = self.fit(&set.features, &set.labels)?;
        artifact.metrics.dropped_rows = set.dropped;
        artifact.metrics.unmapped_employment = set.unmapped_employment;
        Ok(artifact)
    }

    fn check_inputs(&self, features: &[FeatureVector], labels: &[f64]) -> EngineResult<()> {
        if features.len() != labels.len() {
            return Err(EngineError::InsufficientData(format!(
                "{} feature rows but {} labels",
                features.len(),
                labels.len()
            )));
        }

        if features.len() < self.config.min_rows.max(2) {
            return Err(EngineError::InsufficientData(format!(
                "{} labeled rows, need at least {}",
                features.len(),
                self.config.min_rows.max(2)
            )));
        }

        if let Some((row, label)) = labels
            .iter()
            .enumerate()
            .find(|&(_, &l)| l != 0.0 && l != 1.0)
        {
            return Err(EngineError::InsufficientData(format!(
                "label {} at row {} is not 0 or 1",
                label, row
            )));
        }

        let positives = labels.iter().filter(|&&l| l == 1.0).count();
        if positives == 0 || positives == labels.len() {
            return Err(EngineError::InsufficientData(
                "labels contain a single class".to_string(),
            ));
        }

        if let Some(row) = features
            .iter()
            .position(|f| f.as_array().iter().any(|v| !v.is_finite()))
        {
            return Err(EngineError::InsufficientData(format!(
                "row {} has a non-finite feature value",
                row
            )));
        }

        let first = features[0].as_array();
        for (column, name) in FEATURE_LAYOUT.iter().enumerate() {
            if features.iter().all(|f| f.as_array()[column] == first[column]) {
                return Err(EngineError::InsufficientData(format!(
                    "feature `{}` is constant ({}) across all rows",
                    name, first[column]
                )));
            }
        }

        Ok(())
    }
}

/// Rows the splitter holds out for `fraction` (truncated, as smartcore does)
fn holdout_size(n: usize, fraction: f64) -> usize {
    if !(fraction > 0.0) {
        return 0;
    }
    (((n as f32) * (fraction as f32)) as usize).min(n)
}

fn column_medians(x: &DenseMatrix<f64>) -> ImputationDefaults {
    let (n_rows, _) = x.shape();
    let mut medians = [0.0; FEATURE_COUNT];
    for (column, slot) in medians.iter_mut().enumerate() {
        let mut values: Vec<f64> = (0..n_rows).map(|row| *x.get((row, column))).collect();
        values.sort_by(|a, b| a.total_cmp(b));
        let mid = values.len() / 2;
        *slot = if values.is_empty() {
            0.0
        } else if values.len() % 2 == 0 {
            (values[mid - 1] + values[mid]) / 2.0
        } else {
            values[mid]
        };
    }
    ImputationDefaults::from_array(medians)
}
