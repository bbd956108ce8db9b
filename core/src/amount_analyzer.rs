//! Amount analyzer: order size and round-number spending.

use crate::{
    analyzer::{require_finite, DimensionScore, ProfileContext, RiskAnalyzer, RiskDimension, ScoreBuilder},
    config::RuleConfig,
    error::ScoringResult,
    indicator::{IndicatorType, RiskIndicator, Severity},
};

pub struct AmountAnalyzer;

impl RiskAnalyzer for AmountAnalyzer {
    fn dimension(&self) -> RiskDimension {
        RiskDimension::Amount
    }

    fn analyze(&self, ctx: &ProfileContext<'_>, rules: &RuleConfig) -> ScoringResult<DimensionScore> {
        let dimension = self.dimension();
        let avg_order_value = require_finite(dimension, "avg_order_value", ctx.profile.avg_order_value)?;
        let total_spent = require_finite(dimension, "total_spent", ctx.profile.total_spent)?;

        let mut score = ScoreBuilder::new(dimension);

        if avg_order_value > rules.high_average_order {
            score.add(
                rules.high_average_order_weight,
                RiskIndicator::new(
                    IndicatorType::HighAverageOrder,
                    Severity::Medium,
                    0.7,
                    format!("High average order value: ${avg_order_value:.2}"),
                    &["amount_anomaly"],
                ),
            );
        }

        if total_spent > 0.0
            && rules.round_number_unit > 0.0
            && total_spent % rules.round_number_unit == 0.0
        {
            score.add(
                rules.round_number_weight,
                RiskIndicator::new(
                    IndicatorType::RoundNumberBias,
                    Severity::Low,
                    0.5,
                    "Transaction amounts show round number pattern",
                    &["amount_pattern"],
                ),
            );
        }

        Ok(score.finish())
    }
}
