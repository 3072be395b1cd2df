//! Scoring Engine - one call from feature input to a scored decision
//!
//! Combines the scorer, explainer and bander. The explainer looks at the
//! features the caller actually supplied; the bander sees the
//! full-precision probability.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::config::EngineConfig;
use super::dataset::{ScoreLogRecord, ScoreSink};
use super::error::EngineResult;
use super::explain::Explainer;
use super::features::{FeatureInput, ObservedFeatures};
use super::model::{round2, Confidence, ModelArtifact, Scorer};
use super::risk::{RiskBand, RiskBander};

/// Everything the engine knows about one scored request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Rounded to two decimals
    pub probability: f64,
    pub confidence: Confidence,
    pub band: RiskBand,
    pub reasons: Vec<String>,
    pub imputed: Vec<String>,
    pub artifact_id: String,
}

impl ScoreResult {
    pub fn to_response(&self) -> ScoreResponse {
        ScoreResponse {
            anton_score: self.probability,
            risk_band: self.band,
            explanation: self.reasons.clone(),
            confidence: self.confidence,
        }
    }
}

/// Outbound shape for API callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub anton_score: f64,
    pub risk_band: RiskBand,
    pub explanation: Vec<String>,
    pub confidence: Confidence,
}

#[derive(Debug, Default)]
pub struct ScoringEngine {
    scorer: Scorer,
    explainer: Explainer,
    bander: RiskBander,
}

impl ScoringEngine {
    pub fn new(scorer: Scorer, explainer: Explainer, bander: RiskBander) -> Self {
        Self {
            scorer,
            explainer,
            bander,
        }
    }

    /// Default explainer and bands over a freshly attached artifact
    pub fn with_artifact(artifact: Arc<ModelArtifact>) -> EngineResult<Self> {
        Ok(Self::new(
            Scorer::with_artifact(artifact)?,
            Explainer::default(),
            RiskBander::default(),
        ))
    }

    /// Bands and confidence levels from `config`; no artifact attached yet
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            Scorer::new().with_policy(config.confidence),
            Explainer::default(),
            RiskBander::new(config.bands),
        )
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn explainer(&self) -> &Explainer {
        &self.explainer
    }

    pub fn bander(&self) -> &RiskBander {
        &self.bander
    }

    pub fn evaluate(&self, input: &FeatureInput) -> EngineResult<ScoreResult> {
        self.evaluate_inner(input).map(|(result, _)| result)
    }

    pub fn respond(&self, input: &FeatureInput) -> EngineResult<ScoreResponse> {
        Ok(self.evaluate(input)?.to_response())
    }

    /// Evaluate and hand one record to `sink`. A failing sink is logged and
    /// does not fail the request.
    pub fn evaluate_logged(
        &self,
        input: &FeatureInput,
        sink: &dyn ScoreSink,
    ) -> EngineResult<ScoreResult> {
        let (result, observed) = self.evaluate_inner(input)?;
        let record = ScoreLogRecord::new(
            &observed,
            result.probability,
            result.band,
            &result.artifact_id,
        );
        if let Err(e) = sink.record(&record) {
            log::warn!("Failed to log score record: {}", e);
        }
        Ok(result)
    }

    fn evaluate_inner(&self, input: &FeatureInput) -> EngineResult<(ScoreResult, ObservedFeatures)> {
        let artifact = self.scorer.artifact()?;
        let observed = input.observe(&artifact.layout)?;
        let prediction = self.scorer.predict_with(&artifact, &observed)?;

        let result = ScoreResult {
            probability: round2(prediction.probability),
            confidence: prediction.confidence,
            band: self.bander.band(prediction.probability),
            reasons: self.explainer.explain_observed(&observed),
            imputed: prediction.imputed,
            artifact_id: prediction.artifact_id,
        };
        Ok((result, observed))
    }
}
