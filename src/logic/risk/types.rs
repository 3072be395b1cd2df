//! Risk Types

use serde::{Deserialize, Serialize};

/// Risk bands, ordered from safest to riskiest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskBand {
    /// Probability above the upper cut point
    Low,
    Medium,
    /// Probability at or below the lower cut point
    High,
}

impl RiskBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBand::Low => "Low",
            RiskBand::Medium => "Medium",
            RiskBand::High => "High",
        }
    }

    pub fn severity_level(&self) -> u8 {
        match self {
            RiskBand::Low => 0,
            RiskBand::Medium => 1,
            RiskBand::High => 2,
        }
    }
}

impl std::fmt::Display for RiskBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RiskBand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(RiskBand::Low),
            "medium" => Ok(RiskBand::Medium),
            "high" => Ok(RiskBand::High),
            other => Err(format!("unknown risk band `{}`", other)),
        }
    }
}
