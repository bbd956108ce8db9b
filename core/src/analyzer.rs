//! The analyzer contract: one implementation per risk dimension.
//!
//! RULE: Analyzers are pure. They read the profile context and the rules,
//! and return a score plus evidence. They never see each other's output
//! and never touch shared state, so the engine may run them in any order
//! on any thread.

use crate::{
    config::RuleConfig,
    error::{ScoringError, ScoringResult},
    indicator::RiskIndicator,
    profile::CustomerProfile,
    timeline::{TransactionTimeline, VelocityMetrics},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The six named axes of fraud signal.
/// NEVER reorder: `ALL` fixes the order indicators are emitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskDimension {
    Velocity,
    Geographic,
    Behavioral,
    Profile,
    Amount,
    Temporal,
}

impl RiskDimension {
    pub const ALL: [RiskDimension; 6] = [
        Self::Velocity,
        Self::Geographic,
        Self::Behavioral,
        Self::Profile,
        Self::Amount,
        Self::Temporal,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Velocity => "velocity",
            Self::Geographic => "geographic",
            Self::Behavioral => "behavioral",
            Self::Profile => "profile",
            Self::Amount => "amount",
            Self::Temporal => "temporal",
        }
    }

    /// Feature-map key for this dimension's score.
    pub fn feature_key(&self) -> String {
        format!("risk_{}", self.name())
    }
}

impl fmt::Display for RiskDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything an analyzer may look at for one customer.
#[derive(Debug, Clone, Copy)]
pub struct ProfileContext<'a> {
    pub profile: &'a CustomerProfile,
    pub timeline: &'a TransactionTimeline,
    pub velocity: &'a VelocityMetrics,
}

/// A single dimension's result.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionScore {
    pub dimension: RiskDimension,
    /// Clamped to [0, 1].
    pub score: f64,
    pub indicators: Vec<RiskIndicator>,
}

/// Accumulates additive contributions for one dimension.
pub struct ScoreBuilder {
    dimension: RiskDimension,
    raw: f64,
    indicators: Vec<RiskIndicator>,
}

impl ScoreBuilder {
    pub fn new(dimension: RiskDimension) -> Self {
        Self {
            dimension,
            raw: 0.0,
            indicators: Vec::new(),
        }
    }

    pub fn add(&mut self, weight: f64, indicator: RiskIndicator) {
        self.raw += weight;
        self.indicators.push(indicator);
    }

    pub fn finish(self) -> DimensionScore {
        DimensionScore {
            dimension: self.dimension,
            score: self.raw.clamp(0.0, 1.0),
            indicators: self.indicators,
        }
    }
}

pub trait RiskAnalyzer: Send + Sync {
    fn dimension(&self) -> RiskDimension;

    fn analyze(&self, ctx: &ProfileContext<'_>, rules: &RuleConfig) -> ScoringResult<DimensionScore>;
}

/// Reject NaN/infinite inputs so a broken field fails only its dimension.
pub fn require_finite(dimension: RiskDimension, field: &str, value: f64) -> ScoringResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ScoringError::AnalyzerFailed {
            dimension,
            reason: format!("{field} is not a finite number ({value})"),
        })
    }
}

/// The standard analyzer set, in `RiskDimension::ALL` order.
pub fn default_analyzers() -> Vec<Box<dyn RiskAnalyzer>> {
    vec![
        Box::new(crate::velocity_analyzer::VelocityAnalyzer),
        Box::new(crate::geographic_analyzer::GeographicAnalyzer),
        Box::new(crate::behavioral_analyzer::BehavioralAnalyzer),
        Box::new(crate::profile_analyzer::ProfileAnalyzer),
        Box::new(crate::amount_analyzer::AmountAnalyzer),
        Box::new(crate::temporal_analyzer::TemporalAnalyzer),
    ]
}
