//! Behavioral analyzer: spending and basket shape versus tenure.

use crate::{
    analyzer::{require_finite, DimensionScore, ProfileContext, RiskAnalyzer, RiskDimension, ScoreBuilder},
    config::RuleConfig,
    error::ScoringResult,
    indicator::{IndicatorType, RiskIndicator, Severity},
    profile::CustomerSegment,
};

pub struct BehavioralAnalyzer;

impl RiskAnalyzer for BehavioralAnalyzer {
    fn dimension(&self) -> RiskDimension {
        RiskDimension::Behavioral
    }

    fn analyze(&self, ctx: &ProfileContext<'_>, rules: &RuleConfig) -> ScoringResult<DimensionScore> {
        let dimension = self.dimension();
        let profile = ctx.profile;
        let total_spent = require_finite(dimension, "total_spent", profile.total_spent)?;
        let diversity = require_finite(
            dimension,
            "product_diversity_score",
            profile.product_diversity_score,
        )?;

        let mut score = ScoreBuilder::new(dimension);

        if profile.customer_segment == CustomerSegment::New
            && total_spent > rules.new_customer_spend_threshold
        {
            score.add(
                rules.new_customer_spend_weight,
                RiskIndicator::new(
                    IndicatorType::NewCustomerHighSpending,
                    Severity::Medium,
                    0.7,
                    format!("New customer with high spending: ${total_spent:.2}"),
                    &["unusual_behavior_pattern"],
                ),
            );
        }

        if diversity > rules.diversity_threshold && profile.total_orders >= rules.diversity_min_orders {
            score.add(
                rules.diversity_weight,
                RiskIndicator::new(
                    IndicatorType::UnusualProductDiversity,
                    Severity::Low,
                    0.6,
                    "Unusually diverse product purchase pattern",
                    &["behavioral_anomaly"],
                ),
            );
        }

        Ok(score.finish())
    }
}
