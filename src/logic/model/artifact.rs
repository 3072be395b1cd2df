//! Model Artifact - the immutable output of training
//!
//! Carries the fitted forest together with everything needed to use it
//! safely: the feature layout it was trained on, the imputation defaults,
//! the configuration, holdout metrics and a checksum over the parts that
//! change predictions.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::config::{ImputationDefaults, TrainerConfig};
use super::forest::RandomForest;
use crate::logic::error::{EngineError, EngineResult};
use crate::logic::features::{LayoutInfo, FEATURE_COUNT};

/// Numbers recorded at the end of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub train_rows: usize,
    pub holdout_rows: usize,
    /// Accuracy on the held-out rows at a 0.5 cut; `None` when nothing was held out
    pub holdout_accuracy: Option<f64>,
    /// Share of positive labels in the training partition
    pub positive_rate: f64,
    /// Survey rows dropped for blank fields before fitting
    #[serde(default)]
    pub dropped_rows: usize,
    /// Rows whose employment code fell outside the lookup
    #[serde(default)]
    pub unmapped_employment: usize,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub id: String,
    pub trained_at: DateTime<Utc>,
    pub layout: LayoutInfo,
    pub imputation: ImputationDefaults,
    pub config: TrainerConfig,
    pub metrics: TrainingMetrics,
    /// Hex SHA-256 over layout, imputation defaults and forest
    pub checksum: String,
    forest: RandomForest,
}

impl ModelArtifact {
    pub fn new(
        forest: RandomForest,
        imputation: ImputationDefaults,
        config: TrainerConfig,
        metrics: TrainingMetrics,
    ) -> EngineResult<Self> {
        let layout = LayoutInfo::current();
        let checksum = content_checksum(&layout, &imputation, &forest)?;
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            trained_at: Utc::now(),
            layout,
            imputation,
            config,
            metrics,
            checksum,
            forest,
        })
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    /// Feature name → column index used during fit
    pub fn feature_columns(&self) -> BTreeMap<String, usize> {
        self.layout
            .feature_names
            .iter()
            .enumerate()
            .map(|(index, name)| (name.clone(), index))
            .collect()
    }

    /// Positive-class probability for one row already in training column order
    pub fn predict_proba(&self, row: &[f64; FEATURE_COUNT]) -> EngineResult<f64> {
        self.forest.predict_proba(row)
    }

    /// Layout, shape and checksum checks; run before an artifact serves requests
    pub fn validate(&self) -> EngineResult<()> {
        self.layout.validate()?;

        if self.layout.feature_names.len() != FEATURE_COUNT
            || self.forest.n_features() != FEATURE_COUNT
        {
            return Err(EngineError::SchemaMismatch(format!(
                "artifact has {} named features and {} forest columns, engine expects {}",
                self.layout.feature_names.len(),
                self.forest.n_features(),
                FEATURE_COUNT
            )));
        }

        if !self.forest.is_well_formed() {
            return Err(EngineError::SchemaMismatch(
                "artifact forest is empty or malformed".to_string(),
            ));
        }

        let actual = content_checksum(&self.layout, &self.imputation, &self.forest)?;
        if actual != self.checksum {
            return Err(EngineError::SchemaMismatch(format!(
                "artifact checksum mismatch: recorded {}, computed {}",
                self.checksum, actual
            )));
        }

        Ok(())
    }

    // ========================================================================
    // STORAGE
    // ========================================================================

    pub fn save(&self, path: &Path) -> EngineResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Saved model artifact {} to {:?}", self.id, path);
        Ok(())
    }

    /// Load and validate
    pub fn load(path: &Path) -> EngineResult<Self> {
        let data = fs::read(path)?;
        let artifact: ModelArtifact = serde_json::from_slice(&data)?;
        artifact.validate()?;

        log::info!(
            "Loaded model artifact {} ({} trees, trained {})",
            artifact.id,
            artifact.forest.n_trees(),
            artifact.trained_at.format("%Y-%m-%d %H:%M:%S")
        );
        Ok(artifact)
    }
}

fn content_checksum(
    layout: &LayoutInfo,
    imputation: &ImputationDefaults,
    forest: &RandomForest,
) -> EngineResult<String> {
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_vec(layout)?);
    hasher.update(serde_json::to_vec(imputation)?);
    hasher.update(serde_json::to_vec(forest)?);
    Ok(hex::encode(hasher.finalize()))
}
