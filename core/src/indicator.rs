use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Every kind of evidence an analyzer can emit.
/// Variants are appended only; the serialized names are stored downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IndicatorType {
    HighVelocity,
    BurstPattern,
    InternationalProfile,
    ImpossibleTravel,
    NewCustomerHighSpending,
    UnusualProductDiversity,
    IncompleteProfile,
    SuspiciousEmail,
    HighAverageOrder,
    RoundNumberBias,
    OffHoursActivity,
}

impl IndicatorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighVelocity => "HIGH_VELOCITY",
            Self::BurstPattern => "BURST_PATTERN",
            Self::InternationalProfile => "INTERNATIONAL_PROFILE",
            Self::ImpossibleTravel => "IMPOSSIBLE_TRAVEL",
            Self::NewCustomerHighSpending => "NEW_CUSTOMER_HIGH_SPENDING",
            Self::UnusualProductDiversity => "UNUSUAL_PRODUCT_DIVERSITY",
            Self::IncompleteProfile => "INCOMPLETE_PROFILE",
            Self::SuspiciousEmail => "SUSPICIOUS_EMAIL",
            Self::HighAverageOrder => "HIGH_AVERAGE_ORDER",
            Self::RoundNumberBias => "ROUND_NUMBER_BIAS",
            Self::OffHoursActivity => "OFF_HOURS_ACTIVITY",
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One explainable piece of evidence behind a dimension score.
/// Read-only once built; fields are reachable through accessors only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskIndicator {
    indicator_type: IndicatorType,
    severity: Severity,
    /// In [0, 1].
    confidence: f64,
    description: String,
    contributing_factors: BTreeSet<String>,
}

impl RiskIndicator {
    pub fn new(
        indicator_type: IndicatorType,
        severity: Severity,
        confidence: f64,
        description: impl Into<String>,
        factors: &[&str],
    ) -> Self {
        Self {
            indicator_type,
            severity,
            confidence: confidence.clamp(0.0, 1.0),
            description: description.into(),
            contributing_factors: factors.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn indicator_type(&self) -> IndicatorType {
        self.indicator_type
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn contributing_factors(&self) -> &BTreeSet<String> {
        &self.contributing_factors
    }
}
