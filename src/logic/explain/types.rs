use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    GreaterThan,
    AtLeast,
}

impl Comparison {
    pub fn holds(&self, value: f64, threshold: f64) -> bool {
        match self {
            Comparison::GreaterThan => value > threshold,
            Comparison::AtLeast => value >= threshold,
        }
    }
}

/// `feature <comparison> threshold` → `reason`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationRule {
    pub feature: String,
    pub comparison: Comparison,
    pub threshold: f64,
    pub reason: String,
}

impl ExplanationRule {
    pub fn new(feature: &str, comparison: Comparison, threshold: f64, reason: &str) -> Self {
        Self {
            feature: feature.to_string(),
            comparison,
            threshold,
            reason: reason.to_string(),
        }
    }
}
