//! Risk Banding Rules & Thresholds
//!
//! Cut points only; the banding itself lives in `bander`.

use serde::{Deserialize, Serialize};

// ============================================================================
// THRESHOLDS
// ============================================================================

/// Above this probability = Low risk
pub const LOW_RISK_MIN: f64 = 0.7;

/// At or below this probability = High risk
pub const HIGH_RISK_MAX: f64 = 0.4;

// ============================================================================
// CONFIGURABLE THRESHOLDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandThresholds {
    /// Probabilities strictly above this are Low risk
    pub low_risk_min: f64,
    /// Probabilities at or below this are High risk; between is Medium
    pub high_risk_max: f64,
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self {
            low_risk_min: LOW_RISK_MIN,
            high_risk_max: HIGH_RISK_MAX,
        }
    }
}

impl BandThresholds {
    /// Cut points must be ordered for the bands to be contiguous
    pub fn is_valid(&self) -> bool {
        self.high_risk_max <= self.low_risk_min
    }
}
