//! Scorer - probability and confidence from a trained artifact
//!
//! The artifact is attached explicitly and held behind an `Arc`, so scoring
//! calls only take a short read lock to clone the pointer. Retraining swaps
//! a new artifact in with [`Scorer::attach`]; in-flight calls finish on the
//! artifact they started with.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::artifact::ModelArtifact;
use crate::logic::error::{EngineError, EngineResult};
use crate::logic::features::{FeatureInput, FeatureVector, ObservedFeatures, FEATURE_COUNT};

// ============================================================================
// ARTIFACT SLOT
// ============================================================================

/// Holder for the artifact currently serving requests
#[derive(Debug, Default)]
pub struct ArtifactSlot {
    inner: RwLock<Option<Arc<ModelArtifact>>>,
}

impl ArtifactSlot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validate and install, returning the artifact it replaced
    pub fn replace(&self, artifact: Arc<ModelArtifact>) -> EngineResult<Option<Arc<ModelArtifact>>> {
        artifact.validate()?;
        log::info!("Attaching model artifact {}", artifact.id);
        Ok(self.inner.write().replace(artifact))
    }

    pub fn clear(&self) -> Option<Arc<ModelArtifact>> {
        self.inner.write().take()
    }

    pub fn current(&self) -> Option<Arc<ModelArtifact>> {
        self.inner.read().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.read().is_some()
    }
}

// ============================================================================
// CONFIDENCE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "Low",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::High => "High",
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Supplied-feature counts at which each level starts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidencePolicy {
    pub high_min_supplied: usize,
    pub medium_min_supplied: usize,
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self {
            high_min_supplied: FEATURE_COUNT,
            medium_min_supplied: 3,
        }
    }
}

impl ConfidencePolicy {
    pub fn level(&self, supplied: usize) -> ConfidenceLevel {
        if supplied >= self.high_min_supplied {
            ConfidenceLevel::High
        } else if supplied >= self.medium_min_supplied {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

/// How much of the request was observed rather than imputed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Confidence {
    pub supplied: usize,
    pub total: usize,
    /// supplied / total
    pub fraction: f64,
    pub level: ConfidenceLevel,
}

impl Confidence {
    pub fn from_supplied(supplied: usize, policy: &ConfidencePolicy) -> Self {
        let supplied = supplied.min(FEATURE_COUNT);
        Self {
            supplied,
            total: FEATURE_COUNT,
            fraction: supplied as f64 / FEATURE_COUNT as f64,
            level: policy.level(supplied),
        }
    }

    pub fn full() -> Self {
        Self::from_supplied(FEATURE_COUNT, &ConfidencePolicy::default())
    }

    pub fn imputed(&self) -> usize {
        self.total - self.supplied
    }
}

// ============================================================================
// PREDICTION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Full-precision P(label = 1); use this for banding
    pub probability: f64,
    pub confidence: Confidence,
    /// Names of the features filled from defaults
    pub imputed: Vec<String>,
    /// Feature values the model actually saw, after imputation
    pub effective: FeatureVector,
    pub artifact_id: String,
}

impl Prediction {
    /// Probability rounded to two decimals for reporting
    pub fn reported_probability(&self) -> f64 {
        round2(self.probability)
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// SCORER
// ============================================================================

#[derive(Debug, Default)]
pub struct Scorer {
    slot: ArtifactSlot,
    policy: ConfidencePolicy,
}

impl Scorer {
    /// Scorer with no artifact; every score call fails until one is attached
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_artifact(artifact: Arc<ModelArtifact>) -> EngineResult<Self> {
        let scorer = Self::new();
        scorer.attach(artifact)?;
        Ok(scorer)
    }

    pub fn with_policy(mut self, policy: ConfidencePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Install (or swap in) an artifact after validating it
    pub fn attach(&self, artifact: Arc<ModelArtifact>) -> EngineResult<Option<Arc<ModelArtifact>>> {
        self.slot.replace(artifact)
    }

    pub fn detach(&self) -> Option<Arc<ModelArtifact>> {
        self.slot.clear()
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.is_loaded()
    }

    pub fn artifact(&self) -> EngineResult<Arc<ModelArtifact>> {
        self.slot.current().ok_or(EngineError::ModelNotLoaded)
    }

    pub fn policy(&self) -> &ConfidencePolicy {
        &self.policy
    }

    pub fn score(&self, input: &FeatureInput) -> EngineResult<Prediction> {
        let artifact = self.artifact()?;
        let observed = input.observe(&artifact.layout)?;
        self.predict_with(&artifact, &observed)
    }

    /// Legacy contract: all five features present and none NaN
    pub fn score_strict(&self, vector: &FeatureVector) -> EngineResult<Prediction> {
        let artifact = self.artifact()?;
        self.predict_with(&artifact, &ObservedFeatures::from_strict(vector)?)
    }

    /// Adaptive contract: any subset of the five, by name
    pub fn score_partial(&self, mapping: &BTreeMap<String, f64>) -> EngineResult<Prediction> {
        let artifact = self.artifact()?;
        let observed = ObservedFeatures::resolve(mapping, &artifact.layout)?;
        self.predict_with(&artifact, &observed)
    }

    /// `observed` must already be in the attached artifact's column order
    pub fn score_observed(&self, observed: &ObservedFeatures) -> EngineResult<Prediction> {
        let artifact = self.artifact()?;
        self.predict_with(&artifact, observed)
    }

    /// Score against a specific artifact, typically one the caller already
    /// resolved `observed` with. The slot is not consulted.
    pub fn predict_with(
        &self,
        artifact: &ModelArtifact,
        observed: &ObservedFeatures,
    ) -> EngineResult<Prediction> {
        let effective = observed.fill(&artifact.imputation.as_array());
        let probability = artifact.predict_proba(&effective.as_array())?.clamp(0.0, 1.0);
        let confidence = Confidence::from_supplied(observed.supplied_count(), &self.policy);
        let imputed: Vec<String> = observed
            .missing_names()
            .into_iter()
            .map(String::from)
            .collect();

        log::debug!(
            "Scored p={:.4} with {}/{} features supplied (imputed: {:?})",
            probability,
            confidence.supplied,
            confidence.total,
            imputed
        );

        Ok(Prediction {
            probability,
            confidence,
            imputed,
            effective,
            artifact_id: artifact.id.clone(),
        })
    }
}
