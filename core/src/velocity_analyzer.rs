//! Velocity analyzer: bursts of activity in the synthesized timeline.
//!
//!   1. HIGH_VELOCITY when any single day reaches the daily threshold
//!   2. BURST_PATTERN for established customers whose id hash lands on the
//!      burst modulus (synthetic stand-in for a clustering detector)

use crate::{
    analyzer::{DimensionScore, ProfileContext, RiskAnalyzer, RiskDimension, ScoreBuilder},
    config::RuleConfig,
    error::ScoringResult,
    hash::hash_triggers,
    indicator::{IndicatorType, RiskIndicator, Severity},
};

pub struct VelocityAnalyzer;

impl RiskAnalyzer for VelocityAnalyzer {
    fn dimension(&self) -> RiskDimension {
        RiskDimension::Velocity
    }

    fn analyze(&self, ctx: &ProfileContext<'_>, rules: &RuleConfig) -> ScoringResult<DimensionScore> {
        let mut score = ScoreBuilder::new(self.dimension());
        let max_daily = ctx.velocity.max_daily;

        if max_daily >= rules.high_velocity_daily {
            score.add(
                rules.high_velocity_weight,
                RiskIndicator::new(
                    IndicatorType::HighVelocity,
                    Severity::High,
                    0.8,
                    format!("Customer made {max_daily} transactions in a single day"),
                    &["unusual_transaction_frequency"],
                ),
            );
        }

        if ctx.profile.total_orders >= rules.burst_min_orders
            && !ctx.timeline.is_empty()
            && hash_triggers(ctx.profile.customer_id, rules.burst_hash_modulus)
        {
            score.add(
                rules.burst_weight,
                RiskIndicator::new(
                    IndicatorType::BurstPattern,
                    Severity::Medium,
                    0.7,
                    "Detected burst of transactions in short timeframe",
                    &["transaction_clustering"],
                ),
            );
        }

        Ok(score.finish())
    }
}
