//! Feature Vector - Core data structure for scoring input
//!
//! Two shapes reach the engine:
//! - [`FeatureVector`]: all five canonical features present (strict contract)
//! - a name → value mapping where any subset may be missing (adaptive contract)
//!
//! [`FeatureInput`] tags which contract a request uses so the scorer never
//! has to guess from the shape of the data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::layout::{
    LayoutInfo, DIGITAL_SCORE, EMPLOYMENT_SCORE, ENGAGEMENT, FEATURE_COUNT, FEATURE_LAYOUT,
    FINANCIAL_ACTIVITY, INCOME_WEIGHT,
};
use crate::logic::error::{EngineError, EngineResult};

// ============================================================================
// FULL FEATURE VECTOR
// ============================================================================

/// The five canonical behavioral features
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub digital_score: f64,
    pub financial_activity: f64,
    pub engagement: f64,
    pub income_weight: f64,
    pub employment_score: f64,
}

impl FeatureVector {
    pub fn new(
        digital_score: f64,
        financial_activity: f64,
        engagement: f64,
        income_weight: f64,
        employment_score: f64,
    ) -> Self {
        Self {
            digital_score,
            financial_activity,
            engagement,
            income_weight,
            employment_score,
        }
    }

    pub fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        Self::new(
            values[DIGITAL_SCORE],
            values[FINANCIAL_ACTIVITY],
            values[ENGAGEMENT],
            values[INCOME_WEIGHT],
            values[EMPLOYMENT_SCORE],
        )
    }

    /// Legacy positional contract: exactly five values in layout order.
    ///
    /// Fewer values (or a NaN in any slot) is a `MissingFeature`; more than
    /// five is a `SchemaMismatch`.
    pub fn from_positional(values: &[f64]) -> EngineResult<Self> {
        if values.len() > FEATURE_COUNT {
            return Err(EngineError::SchemaMismatch(format!(
                "expected {} positional features, got {}",
                FEATURE_COUNT,
                values.len()
            )));
        }

        let mut array = [0.0; FEATURE_COUNT];
        for (index, name) in FEATURE_LAYOUT.iter().enumerate() {
            match values.get(index) {
                Some(v) if !v.is_nan() => array[index] = *v,
                _ => return Err(EngineError::missing(*name)),
            }
        }

        Ok(Self::from_array(array))
    }

    /// Strict contract check: a NaN slot counts as a missing feature
    pub fn check_complete(&self) -> EngineResult<()> {
        match self.named_values().find(|(_, v)| v.is_nan()) {
            Some((name, _)) => Err(EngineError::missing(name)),
            None => Ok(()),
        }
    }

    /// Values in layout order
    pub fn as_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.digital_score,
            self.financial_activity,
            self.engagement,
            self.income_weight,
            self.employment_score,
        ]
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.as_array().get(index).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        super::layout::feature_index(name).and_then(|i| self.get(i))
    }

    /// Named pairs, handy for logging and JSON rows
    pub fn named_values(&self) -> impl Iterator<Item = (&'static str, f64)> {
        FEATURE_LAYOUT.iter().copied().zip(self.as_array())
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self::from_array(values)
    }
}

// ============================================================================
// OBSERVED (POSSIBLY PARTIAL) FEATURES
// ============================================================================

/// Features as supplied by a caller, in layout order; `None` means absent
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ObservedFeatures {
    pub values: [Option<f64>; FEATURE_COUNT],
}

impl ObservedFeatures {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_vector(vector: &FeatureVector) -> Self {
        Self {
            values: vector.as_array().map(Some),
        }
    }

    /// Strict request: all five must be real numbers
    pub fn from_strict(vector: &FeatureVector) -> EngineResult<Self> {
        vector.check_complete()?;
        Ok(Self::from_vector(vector))
    }

    /// Resolve a name → value mapping against a recorded layout.
    ///
    /// Unknown names are a `SchemaMismatch`. NaN counts as absent.
    pub fn resolve(mapping: &BTreeMap<String, f64>, layout: &LayoutInfo) -> EngineResult<Self> {
        let mut observed = Self::empty();

        for (name, value) in mapping {
            let index = layout.column_index(name).ok_or_else(|| {
                EngineError::SchemaMismatch(format!("unrecognized feature `{}`", name))
            })?;
            if index >= FEATURE_COUNT {
                return Err(EngineError::SchemaMismatch(format!(
                    "feature `{}` maps to column {} outside the engine layout",
                    name, index
                )));
            }
            if !value.is_nan() {
                observed.values[index] = Some(*value);
            }
        }

        Ok(observed)
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    pub fn supplied_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Names of the features that were not supplied
    pub fn missing_names(&self) -> Vec<&'static str> {
        FEATURE_LAYOUT
            .iter()
            .zip(self.values.iter())
            .filter(|(_, v)| v.is_none())
            .map(|(name, _)| *name)
            .collect()
    }

    /// Fill every gap from `defaults` (layout order)
    pub fn fill(&self, defaults: &[f64; FEATURE_COUNT]) -> FeatureVector {
        let mut array = *defaults;
        for (slot, value) in array.iter_mut().zip(self.values.iter()) {
            if let Some(v) = value {
                *slot = *v;
            }
        }
        FeatureVector::from_array(array)
    }

    /// Strict view: every feature must be present
    pub fn complete(&self) -> EngineResult<FeatureVector> {
        match self.missing_names().first() {
            Some(name) => Err(EngineError::missing(*name)),
            None => Ok(self.fill(&[0.0; FEATURE_COUNT])),
        }
    }
}

// ============================================================================
// TAGGED INPUT
// ============================================================================

/// A scoring request under one of the two contracts
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureInput {
    /// All five features present
    Strict(FeatureVector),
    /// Any subset of the five, by name
    Partial(BTreeMap<String, f64>),
}

impl FeatureInput {
    pub fn partial<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        FeatureInput::Partial(
            pairs
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        )
    }

    pub fn positional(values: &[f64]) -> EngineResult<Self> {
        FeatureVector::from_positional(values).map(FeatureInput::Strict)
    }

    /// Resolve against a recorded layout into observed features
    pub fn observe(&self, layout: &LayoutInfo) -> EngineResult<ObservedFeatures> {
        match self {
            FeatureInput::Strict(vector) => ObservedFeatures::from_strict(vector),
            FeatureInput::Partial(mapping) => ObservedFeatures::resolve(mapping, layout),
        }
    }
}

impl From<FeatureVector> for FeatureInput {
    fn from(vector: FeatureVector) -> Self {
        FeatureInput::Strict(vector)
    }
}

// ============================================================================
// TESTS
// ============================================================================
