//! Engine configuration
//!
//! Everything tunable in one serde struct. Missing sections fall back to
//! their defaults, so a config file only needs the values it changes.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{EngineError, EngineResult};
use super::features::EngineerConfig;
use super::model::{ConfidencePolicy, TrainerConfig};
use super::risk::BandThresholds;
use crate::logic::features::FEATURE_COUNT;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub trainer: TrainerConfig,
    pub engineer: EngineerConfig,
    pub bands: BandThresholds,
    pub confidence: ConfidencePolicy,
}

impl EngineConfig {
    /// Defaults with the trainer overridden from `ANTON_*` env vars
    pub fn from_env() -> Self {
        Self {
            trainer: TrainerConfig::from_env(),
            ..Default::default()
        }
    }

    pub fn load(path: &Path) -> EngineResult<Self> {
        let data = fs::read(path)?;
        let config: EngineConfig = serde_json::from_slice(&data)?;
        config.validate()?;
        log::info!("Loaded engine config from {:?}", path);
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> EngineResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> EngineResult<()> {
        if !self.bands.is_valid() {
            return Err(EngineError::Config(format!(
                "band cut points out of order: high_risk_max {} > low_risk_min {}",
                self.bands.high_risk_max, self.bands.low_risk_min
            )));
        }
        if self.confidence.medium_min_supplied > self.confidence.high_min_supplied
            || self.confidence.high_min_supplied > FEATURE_COUNT
        {
            return Err(EngineError::Config(format!(
                "confidence levels must satisfy medium ({}) <= high ({}) <= {}",
                self.confidence.medium_min_supplied,
                self.confidence.high_min_supplied,
                FEATURE_COUNT
            )));
        }
        self.trainer.validate()?;
        if !(self.engineer.income_scale.is_finite() && self.engineer.income_scale > 0.0) {
            return Err(EngineError::Config(format!(
                "income_scale {} must be positive",
                self.engineer.income_scale
            )));
        }
        Ok(())
    }
}
