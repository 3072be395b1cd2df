use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::features::layout::{
    self, DIGITAL_SCORE, EMPLOYMENT_SCORE, ENGAGEMENT, FINANCIAL_ACTIVITY, INCOME_WEIGHT,
};
use crate::logic::features::ObservedFeatures;
use crate::logic::risk::RiskBand;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScoreLogRecord {
    pub timestamp: DateTime<Utc>,

    // Feature contract
    pub feature_version: u8,
    pub layout_hash: u32,

    // Inputs as supplied; None when imputed
    pub digital_score: Option<f64>,
    pub financial_activity: Option<f64>,
    pub engagement: Option<f64>,
    pub income_weight: Option<f64>,
    pub employment_score: Option<f64>,

    // Outcome
    pub anton_score: f64,
    pub risk_band: RiskBand,
    pub artifact_id: String,
}

impl ScoreLogRecord {
    pub fn new(
        observed: &ObservedFeatures,
        anton_score: f64,
        risk_band: RiskBand,
        artifact_id: &str,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            feature_version: layout::FEATURE_VERSION,
            layout_hash: layout::layout_hash(),
            digital_score: observed.get(DIGITAL_SCORE),
            financial_activity: observed.get(FINANCIAL_ACTIVITY),
            engagement: observed.get(ENGAGEMENT),
            income_weight: observed.get(INCOME_WEIGHT),
            employment_score: observed.get(EMPLOYMENT_SCORE),
            anton_score,
            risk_band,
            artifact_id: artifact_id.to_string(),
        }
    }

    pub fn supplied_count(&self) -> usize {
        [
            self.digital_score,
            self.financial_activity,
            self.engagement,
            self.income_weight,
            self.employment_score,
        ]
        .iter()
        .filter(|v| v.is_some())
        .count()
    }
}
