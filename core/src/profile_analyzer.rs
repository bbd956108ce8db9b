//! Profile analyzer: completeness of the customer record and email hygiene.

use crate::{
    analyzer::{require_finite, DimensionScore, ProfileContext, RiskAnalyzer, RiskDimension, ScoreBuilder},
    config::RuleConfig,
    error::ScoringResult,
    indicator::{IndicatorType, RiskIndicator, Severity},
};

pub struct ProfileAnalyzer;

impl RiskAnalyzer for ProfileAnalyzer {
    fn dimension(&self) -> RiskDimension {
        RiskDimension::Profile
    }

    fn analyze(&self, ctx: &ProfileContext<'_>, rules: &RuleConfig) -> ScoringResult<DimensionScore> {
        let dimension = self.dimension();
        let completeness = require_finite(
            dimension,
            "profile_completeness",
            ctx.profile.profile_completeness,
        )?;

        let mut score = ScoreBuilder::new(dimension);

        if completeness < rules.completeness_threshold {
            score.add(
                rules.incomplete_profile_weight,
                RiskIndicator::new(
                    IndicatorType::IncompleteProfile,
                    Severity::Medium,
                    0.8,
                    format!("Profile only {:.1}% complete", completeness * 100.0),
                    &["missing_information"],
                ),
            );
        }

        // Markers match case-insensitively: "TempMail" is as disposable as "tempmail".
        let email = ctx.profile.email_or_empty().to_lowercase();
        if !email.is_empty()
            && rules
                .suspicious_email_markers
                .iter()
                .any(|m| email.contains(&m.to_lowercase()))
        {
            score.add(
                rules.suspicious_email_weight,
                RiskIndicator::new(
                    IndicatorType::SuspiciousEmail,
                    Severity::High,
                    0.9,
                    "Potentially disposable email address",
                    &["email_risk"],
                ),
            );
        }

        Ok(score.finish())
    }
}
