use super::types::{Comparison, ExplanationRule};
use crate::logic::error::{EngineError, EngineResult};
use crate::logic::features::layout::feature_index;
use crate::logic::features::{FeatureVector, ObservedFeatures};

/// Rules in evaluation order; output order follows this list
pub fn default_rules() -> Vec<ExplanationRule> {
    vec![
        ExplanationRule::new("digital_score", Comparison::GreaterThan, 1.0, "High mobile activity"),
        ExplanationRule::new(
            "financial_activity",
            Comparison::GreaterThan,
            2.0,
            "Frequent financial transactions",
        ),
        ExplanationRule::new("income_weight", Comparison::AtLeast, 0.75, "Upper income tier"),
        ExplanationRule::new("employment_score", Comparison::AtLeast, 0.8, "Stable employment"),
    ]
}

#[derive(Debug, Clone)]
pub struct Explainer {
    /// (layout index, rule)
    rules: Vec<(usize, ExplanationRule)>,
}

impl Default for Explainer {
    fn default() -> Self {
        Self::with_rules(default_rules()).unwrap_or_else(|_| Self { rules: Vec::new() })
    }
}

impl Explainer {
    /// Rules naming a feature outside the layout are rejected
    pub fn with_rules(rules: Vec<ExplanationRule>) -> EngineResult<Self> {
        let rules = rules
            .into_iter()
            .map(|rule| match feature_index(&rule.feature) {
                Some(index) => Ok((index, rule)),
                None => Err(EngineError::SchemaMismatch(format!(
                    "explanation rule references unknown feature `{}`",
                    rule.feature
                ))),
            })
            .collect::<EngineResult<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> impl Iterator<Item = &ExplanationRule> {
        self.rules.iter().map(|(_, rule)| rule)
    }

    pub fn explain(&self, vector: &FeatureVector) -> Vec<String> {
        self.explain_observed(&ObservedFeatures::from_vector(vector))
    }

    /// Only supplied features can trigger a reason; imputed gaps never do
    pub fn explain_observed(&self, observed: &ObservedFeatures) -> Vec<String> {
        self.rules
            .iter()
            .filter(|(index, rule)| {
                observed
                    .get(*index)
                    .map_or(false, |value| rule.comparison.holds(value, rule.threshold))
            })
            .map(|(_, rule)| rule.reason.clone())
            .collect()
    }
}
