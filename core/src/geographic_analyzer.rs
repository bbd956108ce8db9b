//! Geographic analyzer: location of the customer relative to home markets.

use crate::{
    analyzer::{DimensionScore, ProfileContext, RiskAnalyzer, RiskDimension, ScoreBuilder},
    config::RuleConfig,
    error::ScoringResult,
    hash::hash_triggers,
    indicator::{IndicatorType, RiskIndicator, Severity},
};

pub struct GeographicAnalyzer;

impl RiskAnalyzer for GeographicAnalyzer {
    fn dimension(&self) -> RiskDimension {
        RiskDimension::Geographic
    }

    fn analyze(&self, ctx: &ProfileContext<'_>, rules: &RuleConfig) -> ScoringResult<DimensionScore> {
        let mut score = ScoreBuilder::new(self.dimension());
        let country = ctx.profile.country.trim().to_lowercase();

        if !rules.is_domestic(&country) {
            let location = if country.is_empty() { "an unknown country" } else { country.as_str() };
            score.add(
                rules.international_weight,
                RiskIndicator::new(
                    IndicatorType::InternationalProfile,
                    Severity::Low,
                    0.6,
                    format!("Customer located in {location}"),
                    &["geographic_location"],
                ),
            );
        }

        // Synthetic stand-in for a real travel-speed check.
        if hash_triggers(ctx.profile.customer_id, rules.impossible_travel_hash_modulus) {
            score.add(
                rules.impossible_travel_weight,
                RiskIndicator::new(
                    IndicatorType::ImpossibleTravel,
                    Severity::High,
                    0.9,
                    "Detected transactions from impossible geographic locations",
                    &["geographic_anomaly", "location_spoofing"],
                ),
            );
        }

        Ok(score.finish())
    }
}
