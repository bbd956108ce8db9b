//! Temporal analyzer: time-of-day patterns in the timeline.

use crate::{
    analyzer::{DimensionScore, ProfileContext, RiskAnalyzer, RiskDimension, ScoreBuilder},
    config::RuleConfig,
    error::ScoringResult,
    hash::hash_triggers,
    indicator::{IndicatorType, RiskIndicator, Severity},
};

pub struct TemporalAnalyzer;

impl RiskAnalyzer for TemporalAnalyzer {
    fn dimension(&self) -> RiskDimension {
        RiskDimension::Temporal
    }

    fn analyze(&self, ctx: &ProfileContext<'_>, rules: &RuleConfig) -> ScoringResult<DimensionScore> {
        let mut score = ScoreBuilder::new(self.dimension());

        // Timelines are synthesized inside business hours, so the off-hours
        // signal is the id-hash stand-in rather than a scan of the instants.
        if !ctx.timeline.is_empty()
            && hash_triggers(ctx.profile.customer_id, rules.off_hours_hash_modulus)
        {
            score.add(
                rules.off_hours_weight,
                RiskIndicator::new(
                    IndicatorType::OffHoursActivity,
                    Severity::Low,
                    0.6,
                    "Unusual transaction timing patterns detected",
                    &["temporal_anomaly"],
                ),
            );
        }

        Ok(score.finish())
    }
}
