//! Composite scoring and risk-level classification.

use crate::{
    analyzer::{DimensionScore, RiskDimension},
    config::{RiskThresholds, RiskWeights},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

const CONFIDENCE_FLOOR: f64 = 0.5;
const CONFIDENCE_SLOPE: f64 = 0.45;
const CONFIDENCE_CAP: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Every level, lowest first.
    pub const ALL: [RiskLevel; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    /// Classification table, checked top-down. The first threshold met wins;
    /// anything below every entry is `Low`.
    const DESCENDING: [RiskLevel; 3] = [Self::Critical, Self::High, Self::Medium];

    pub fn classify(score: f64, thresholds: &RiskThresholds) -> Self {
        Self::DESCENDING
            .into_iter()
            .find(|level| level.lower_bound(thresholds).is_some_and(|min| score >= min))
            .unwrap_or(Self::Low)
    }

    fn lower_bound(&self, thresholds: &RiskThresholds) -> Option<f64> {
        match self {
            Self::Low => None,
            Self::Medium => Some(thresholds.medium),
            Self::High => Some(thresholds.high),
            Self::Critical => Some(thresholds.critical),
        }
    }

    pub fn is_alertable(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub composite_risk_score: f64,
    pub risk_level: RiskLevel,
    pub individual_risk_scores: BTreeMap<RiskDimension, f64>,
    pub classification_confidence: f64,
    /// Dimensions whose analyzer failed and were scored 0.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub omitted_dimensions: Vec<RiskDimension>,
}

impl RiskAssessment {
    pub fn score(&self, dimension: RiskDimension) -> f64 {
        self.individual_risk_scores.get(&dimension).copied().unwrap_or(0.0)
    }
}

/// Weighted sum of the dimension scores, clamped to [0, 1].
/// Dimensions missing from `scores` contribute nothing.
pub fn composite_score(scores: &BTreeMap<RiskDimension, f64>, weights: &RiskWeights) -> f64 {
    RiskDimension::ALL
        .iter()
        .map(|d| weights.weight(*d) * scores.get(d).copied().unwrap_or(0.0))
        .sum::<f64>()
        .clamp(0.0, 1.0)
}

/// Monotonic in the composite, never reaching certainty.
pub fn classification_confidence(composite: f64) -> f64 {
    (CONFIDENCE_FLOOR + composite * CONFIDENCE_SLOPE).min(CONFIDENCE_CAP)
}

pub fn assess(
    dimension_scores: &[DimensionScore],
    omitted_dimensions: Vec<RiskDimension>,
    weights: &RiskWeights,
    thresholds: &RiskThresholds,
) -> RiskAssessment {
    let mut individual: BTreeMap<RiskDimension, f64> =
        RiskDimension::ALL.iter().map(|d| (*d, 0.0)).collect();
    for ds in dimension_scores {
        individual.insert(ds.dimension, ds.score.clamp(0.0, 1.0));
    }

    let composite = composite_score(&individual, weights);
    RiskAssessment {
        composite_risk_score: composite,
        risk_level: RiskLevel::classify(composite, thresholds),
        individual_risk_scores: individual,
        classification_confidence: classification_confidence(composite),
        omitted_dimensions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_one() {
        assert!((RiskWeights::default().total() - 1.0).abs() <= 1e-9);
    }

    #[test]
    fn threshold_boundaries() {
        let t = RiskThresholds::default();
        assert_eq!(RiskLevel::classify(0.9, &t), RiskLevel::Critical);
        assert_eq!(RiskLevel::classify(0.89999, &t), RiskLevel::High);
        assert_eq!(RiskLevel::classify(0.8, &t), RiskLevel::High);
        assert_eq!(RiskLevel::classify(0.6, &t), RiskLevel::Medium);
        assert_eq!(RiskLevel::classify(0.59999, &t), RiskLevel::Low);
        assert_eq!(RiskLevel::classify(0.0, &t), RiskLevel::Low);
        assert_eq!(RiskLevel::classify(1.0, &t), RiskLevel::Critical);
    }

    #[test]
    fn levels_are_ordered() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::Critical);
    }

    #[test]
    fn confidence_is_bounded_and_monotonic() {
        assert!((classification_confidence(0.0) - 0.5).abs() < 1e-12);
        assert!((classification_confidence(1.0) - 0.95).abs() < 1e-12);
        let mut last = 0.0;
        for step in 0..=100 {
            let c = classification_confidence(step as f64 / 100.0);
            assert!((0.5..=0.95).contains(&c), "confidence {c} out of bounds");
            assert!(c >= last, "confidence decreased at step {step}");
            last = c;
        }
    }

    #[test]
    fn composite_clamps_to_unit_interval() {
        let scores: BTreeMap<_, _> = RiskDimension::ALL.iter().map(|d| (*d, 1.0)).collect();
        let c = composite_score(&scores, &RiskWeights::default());
        assert!((c - 1.0).abs() < 1e-9);

        let lopsided = RiskWeights { velocity: 3.0, ..RiskWeights::default() };
        assert_eq!(composite_score(&scores, &lopsided), 1.0);
    }
}
