//! Raw survey records → canonical features
//!
//! Survey rows only exist on the training path. Each required field may be
//! blank in the source data; rows with blanks are dropped before training.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::vector::FeatureVector;
use crate::logic::error::{EngineError, EngineResult};

// ============================================================================
// RAW RECORD
// ============================================================================

/// One historical survey row (financial-inclusion microdata)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    pub mobileowner: Option<f64>,
    #[serde(alias = "pay_online")]
    pub pay_onlne: Option<f64>,
    pub pay_cash: Option<f64>,
    pub saved: Option<f64>,
    pub borrowed: Option<f64>,
    pub receive_wages: Option<f64>,
    pub pay_utilities: Option<f64>,
    pub receive_transfers: Option<f64>,
    pub receive_pension: Option<f64>,
    pub receive_agriculture: Option<f64>,
    /// Income quintile, 1..=4
    pub inc_q: Option<f64>,
    /// Employment category, 1..=4
    pub emp_in: Option<f64>,
}

/// Fields that must be present before a row can be derived
pub const REQUIRED_RAW_FIELDS: &[&str] = &[
    "mobileowner",
    "pay_onlne",
    "pay_cash",
    "saved",
    "borrowed",
    "receive_wages",
    "pay_utilities",
    "receive_transfers",
    "receive_pension",
    "receive_agriculture",
    "inc_q",
    "emp_in",
];

impl RawRecord {
    fn field(&self, name: &'static str) -> EngineResult<f64> {
        let value = match name {
            "mobileowner" => self.mobileowner,
            "pay_onlne" => self.pay_onlne,
            "pay_cash" => self.pay_cash,
            "saved" => self.saved,
            "borrowed" => self.borrowed,
            "receive_wages" => self.receive_wages,
            "pay_utilities" => self.pay_utilities,
            "receive_transfers" => self.receive_transfers,
            "receive_pension" => self.receive_pension,
            "receive_agriculture" => self.receive_agriculture,
            "inc_q" => self.inc_q,
            "emp_in" => self.emp_in,
            _ => None,
        };
        value
            .filter(|v| !v.is_nan())
            .ok_or(EngineError::IncompleteRecord { field: name })
    }

    /// First required field that is blank, if any
    pub fn first_missing(&self) -> Option<&'static str> {
        REQUIRED_RAW_FIELDS
            .iter()
            .copied()
            .find(|name| self.field(name).is_err())
    }
}

// ============================================================================
// CONFIG
// ============================================================================

/// Transform constants for the derivation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineerConfig {
    /// Multiplier applied to the income quintile
    pub income_scale: f64,
    /// Employment category → score
    pub employment_scores: BTreeMap<u8, f64>,
    /// Score for a category missing from the map
    pub unmapped_employment_score: f64,
}

impl Default for EngineerConfig {
    fn default() -> Self {
        Self {
            income_scale: 0.25,
            employment_scores: BTreeMap::from([
                (1, 1.0), // Wage employed
                (2, 0.8), // Self-employed
                (3, 0.5), // Out of labor force
                (4, 0.2), // Unemployed
            ]),
            unmapped_employment_score: 0.0,
        }
    }
}

// ============================================================================
// DERIVATION
// ============================================================================

/// Output of deriving one raw record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derivation {
    pub features: FeatureVector,
    /// False when `emp_in` fell outside the employment map
    pub employment_mapped: bool,
}

/// Labeled feature rows ready for the trainer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingSet {
    pub features: Vec<FeatureVector>,
    pub labels: Vec<f64>,
    /// Rows rejected for blank required fields
    pub dropped: usize,
    /// Rows whose employment code was not in the map
    pub unmapped_employment: usize,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Maps survey fields onto the five scoring features
#[derive(Debug, Clone, Default)]
pub struct FeatureEngineer {
    config: EngineerConfig,
}

impl FeatureEngineer {
    pub fn new(config: EngineerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineerConfig {
        &self.config
    }

    /// Employment code → (score, was_mapped)
    pub fn employment_score(&self, code: f64) -> (f64, bool) {
        let mapped = if code.fract() == 0.0 && (0.0..=f64::from(u8::MAX)).contains(&code) {
            self.config.employment_scores.get(&(code as u8)).copied()
        } else {
            None
        };

        match mapped {
            Some(score) => (score, true),
            None => (self.config.unmapped_employment_score, false),
        }
    }

    /// Derive the feature vector for one record
    pub fn derive(&self, record: &RawRecord) -> EngineResult<Derivation> {
        let digital_score =
            record.field("mobileowner")? + record.field("pay_onlne")? + record.field("pay_cash")?;

        let financial_activity = record.field("saved")?
            + record.field("borrowed")?
            + record.field("receive_wages")?
            + record.field("pay_utilities")?;

        let engagement = record.field("receive_transfers")?
            + record.field("receive_pension")?
            + record.field("receive_agriculture")?;

        let income_weight = record.field("inc_q")? * self.config.income_scale;

        let code = record.field("emp_in")?;
        let (employment_score, employment_mapped) = self.employment_score(code);
        if !employment_mapped {
            log::debug!(
                "Unmapped employment code {} scored as {}",
                code,
                employment_score
            );
        }

        Ok(Derivation {
            features: FeatureVector::new(
                digital_score,
                financial_activity,
                engagement,
                income_weight,
                employment_score,
            ),
            employment_mapped,
        })
    }

    /// Drop incomplete rows, derive the rest, and take `borrowed` as the label
    pub fn prepare(&self, records: &[RawRecord]) -> TrainingSet {
        let mut set = TrainingSet::default();

        for record in records {
            let derivation = match self.derive(record) {
                Ok(d) => d,
                Err(_) => {
                    set.dropped += 1;
                    continue;
                }
            };

            // borrowed is a required field, so derive() already saw it
            let label = record.borrowed.unwrap_or_default();

            if !derivation.employment_mapped {
                set.unmapped_employment += 1;
            }
            set.features.push(derivation.features);
            set.labels.push(label);
        }

        if set.dropped > 0 {
            log::warn!(
                "Dropped {} of {} survey rows with blank required fields",
                set.dropped,
                records.len()
            );
        }
        if set.unmapped_employment > 0 {
            log::warn!(
                "{} rows had an unmapped employment code (scored {})",
                set.unmapped_employment,
                self.config.unmapped_employment_score
            );
        }
        log::info!("Prepared {} training rows", set.len());

        set
    }
}
