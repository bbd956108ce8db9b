//! Fraud alerts for high and critical profiles.

use crate::{
    config::PriorityThresholds,
    engine::EnrichedProfile,
    indicator::IndicatorType,
    scoring::RiskLevel,
    types::{CustomerId, Instant},
};
use serde::{Deserialize, Serialize};

const PRIMARY_INDICATOR_COUNT: usize = 3;
const UNKNOWN_CUSTOMER_NAME: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendedAction {
    ImmediateInvestigationRequired,
    PriorityReview,
    EnhancedMonitoring,
    StandardMonitoring,
}

impl RecommendedAction {
    pub fn for_level(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Critical => Self::ImmediateInvestigationRequired,
            RiskLevel::High => Self::PriorityReview,
            RiskLevel::Medium => Self::EnhancedMonitoring,
            RiskLevel::Low => Self::StandardMonitoring,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ImmediateInvestigationRequired => "IMMEDIATE_INVESTIGATION_REQUIRED",
            Self::PriorityReview => "PRIORITY_REVIEW",
            Self::EnhancedMonitoring => "ENHANCED_MONITORING",
            Self::StandardMonitoring => "STANDARD_MONITORING",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InvestigationPriority {
    #[serde(rename = "P1_URGENT")]
    P1Urgent,
    #[serde(rename = "P2_HIGH")]
    P2High,
    #[serde(rename = "P3_MEDIUM")]
    P3Medium,
    #[serde(rename = "P4_LOW")]
    P4Low,
}

impl InvestigationPriority {
    pub fn for_score(score: f64, thresholds: &PriorityThresholds) -> Self {
        if score >= thresholds.p1_urgent {
            Self::P1Urgent
        } else if score >= thresholds.p2_high {
            Self::P2High
        } else if score >= thresholds.p3_medium {
            Self::P3Medium
        } else {
            Self::P4Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P1Urgent => "P1_URGENT",
            Self::P2High => "P2_HIGH",
            Self::P3Medium => "P3_MEDIUM",
            Self::P4Low => "P4_LOW",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudAlert {
    pub alert_id: String,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub risk_level: RiskLevel,
    pub risk_score: f64,
    /// First indicators in emission order, at most three.
    pub primary_indicators: Vec<IndicatorType>,
    pub alert_timestamp: Instant,
    pub recommended_action: RecommendedAction,
    pub investigation_priority: InvestigationPriority,
}

/// Build an alert for a high or critical profile. Lower levels get `None`.
pub fn generate(
    enriched: &EnrichedProfile,
    now: Instant,
    priorities: &PriorityThresholds,
) -> Option<FraudAlert> {
    let assessment = &enriched.assessment;
    if !assessment.risk_level.is_alertable() {
        return None;
    }

    let customer_id = enriched.profile.customer_id;
    Some(FraudAlert {
        alert_id: format!("FRAUD_{customer_id}_{}", now.timestamp()),
        customer_id,
        customer_name: enriched
            .profile
            .full_name
            .clone()
            .unwrap_or_else(|| UNKNOWN_CUSTOMER_NAME.to_string()),
        risk_level: assessment.risk_level,
        risk_score: assessment.composite_risk_score,
        primary_indicators: enriched
            .indicators
            .iter()
            .take(PRIMARY_INDICATOR_COUNT)
            .map(|i| i.indicator_type())
            .collect(),
        alert_timestamp: now,
        recommended_action: RecommendedAction::for_level(assessment.risk_level),
        investigation_priority: InvestigationPriority::for_score(
            assessment.composite_risk_score,
            priorities,
        ),
    })
}
