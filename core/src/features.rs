//! Flat numeric feature vectors for downstream modeling.
//!
//! The key set is fixed: every vector carries every key in `FEATURE_KEYS`,
//! whatever the profile was missing.

use crate::{
    analyzer::RiskDimension,
    config::RuleConfig,
    indicator::RiskIndicator,
    profile::{CustomerProfile, CustomerSegment},
    scoring::RiskAssessment,
    timeline::VelocityMetrics,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const FEATURE_KEYS: [&str; 18] = [
    // Demographic
    "age",
    "profile_completeness",
    // Transactional
    "total_spent",
    "total_orders",
    "avg_order_value",
    "product_diversity_score",
    "customer_activity_score",
    // Risk components
    "risk_velocity",
    "risk_geographic",
    "risk_behavioral",
    "risk_profile",
    "risk_amount",
    "risk_temporal",
    // Velocity
    "max_daily_transactions",
    "avg_daily_transactions",
    // Encoded categoricals
    "is_international",
    "is_premium_customer",
    "has_risk_indicators",
];

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(BTreeMap<String, f64>);

impl FeatureVector {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    fn set(&mut self, key: &str, value: f64) {
        let value = if value.is_finite() { value } else { 0.0 };
        self.0.insert(key.to_string(), value);
    }
}

pub fn extract(
    profile: &CustomerProfile,
    velocity: &VelocityMetrics,
    assessment: &RiskAssessment,
    indicators: &[RiskIndicator],
    rules: &RuleConfig,
) -> FeatureVector {
    let mut features = FeatureVector::default();

    features.set("age", profile.age.map(f64::from).unwrap_or(0.0));
    features.set("profile_completeness", profile.profile_completeness);

    features.set("total_spent", profile.total_spent);
    features.set("total_orders", f64::from(profile.total_orders));
    features.set("avg_order_value", profile.avg_order_value);
    features.set("product_diversity_score", profile.product_diversity_score);
    features.set("customer_activity_score", profile.customer_activity_score);

    for dimension in RiskDimension::ALL {
        features.set(&dimension.feature_key(), assessment.score(dimension));
    }

    features.set("max_daily_transactions", f64::from(velocity.max_daily));
    features.set("avg_daily_transactions", velocity.avg_daily);

    features.set("is_international", flag(!rules.is_feature_home(&profile.country)));
    features.set(
        "is_premium_customer",
        flag(profile.customer_segment == CustomerSegment::Premium),
    );
    features.set("has_risk_indicators", flag(!indicators.is_empty()));

    features
}

fn flag(condition: bool) -> f64 {
    if condition {
        1.0
    } else {
        0.0
    }
}
