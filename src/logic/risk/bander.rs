//! Risk Bander
//!
//! Pure, total mapping from probability to band. NaN falls through to High.

use super::rules::BandThresholds;
use super::types::RiskBand;

#[derive(Debug, Clone, Copy, Default)]
pub struct RiskBander {
    thresholds: BandThresholds,
}

impl RiskBander {
    pub fn new(thresholds: BandThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &BandThresholds {
        &self.thresholds
    }

    /// Band a full-precision probability
    pub fn band(&self, probability: f64) -> RiskBand {
        if probability > self.thresholds.low_risk_min {
            RiskBand::Low
        } else if probability > self.thresholds.high_risk_max {
            RiskBand::Medium
        } else {
            RiskBand::High
        }
    }
}

/// Band with the default cut points
pub fn band(probability: f64) -> RiskBand {
    RiskBander::default().band(probability)
}
