//! Rule-level tests for the six risk analyzers, driven through the engine.

use chrono::{TimeZone, Utc};
use riskscore_core::{
    analyzer::{DimensionScore, ProfileContext, RiskAnalyzer, RiskDimension},
    config::RuleConfig,
    engine::{EnrichedProfile, RiskEngine},
    error::{ScoringError, ScoringResult},
    indicator::{IndicatorType, Severity},
    profile::{CustomerProfile, CustomerSegment},
};

fn engine() -> RiskEngine {
    RiskEngine::build_test(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
}

/// A domestic, complete, unremarkable customer. Id 7 fires no hash signal.
fn clean_profile() -> CustomerProfile {
    let mut p = CustomerProfile::new(7);
    p.total_orders = 4;
    p.total_spent = 312.45;
    p.avg_order_value = 78.11;
    p.country = "United States".into();
    p.customer_segment = CustomerSegment::Returning;
    p.profile_completeness = 0.9;
    p.product_diversity_score = 0.4;
    p.email = Some("sophia.brown@example.com".into());
    p.age = Some(41);
    p
}

fn kinds(e: &EnrichedProfile) -> Vec<IndicatorType> {
    e.indicators.iter().map(|i| i.indicator_type()).collect()
}

#[test]
fn clean_profile_scores_zero_everywhere() {
    let e = engine().enrich(&clean_profile());
    for d in RiskDimension::ALL {
        assert_eq!(e.assessment.score(d), 0.0, "{d} should be 0");
    }
    assert!(e.indicators.is_empty());
    assert_eq!(e.features.get("has_risk_indicators"), Some(0.0));
}

#[test]
fn high_velocity_and_burst() {
    // 742 hashes onto the burst modulus; 200 orders pile onto single days.
    let mut p = clean_profile();
    p.customer_id = 742;
    p.total_orders = 200;
    let e = engine().enrich(&p);

    assert!(e.velocity.max_daily >= 5, "velocity was {:?}", e.velocity);
    assert_eq!(e.assessment.score(RiskDimension::Velocity), 1.0);
    let high_velocity = &e.indicators[0];
    assert_eq!(high_velocity.indicator_type(), IndicatorType::HighVelocity);
    assert_eq!(high_velocity.severity(), Severity::High);
    assert_eq!(high_velocity.confidence(), 0.8);
    assert_eq!(e.indicators[1].indicator_type(), IndicatorType::BurstPattern);
    assert_eq!(e.indicators[1].severity(), Severity::Medium);
}

#[test]
fn burst_needs_ten_orders() {
    let mut p = clean_profile();
    p.customer_id = 742;
    p.total_orders = 9;
    let e = engine().enrich(&p);
    assert!(!kinds(&e).contains(&IndicatorType::BurstPattern));
}

#[test]
fn international_is_case_insensitive() {
    for country in ["united states", "CANADA", "United Kingdom"] {
        let mut p = clean_profile();
        p.country = country.into();
        let e = engine().enrich(&p);
        assert_eq!(e.assessment.score(RiskDimension::Geographic), 0.0, "{country}");
    }

    let mut p = clean_profile();
    p.country = "Japan".into();
    let e = engine().enrich(&p);
    assert!((e.assessment.score(RiskDimension::Geographic) - 0.3).abs() < 1e-12);
    assert_eq!(kinds(&e), vec![IndicatorType::InternationalProfile]);
    assert_eq!(e.indicators[0].description(), "Customer located in japan");
}

#[test]
fn uk_is_domestic_for_scoring_but_international_as_a_feature() {
    let mut p = clean_profile();
    p.country = "United Kingdom".into();
    let e = engine().enrich(&p);
    assert_eq!(e.assessment.score(RiskDimension::Geographic), 0.0);
    assert_eq!(e.features.get("is_international"), Some(1.0));
}

#[test]
fn impossible_travel_combines_with_international() {
    let mut p = clean_profile();
    p.customer_id = 235; // hash % 25 == 0
    p.country = "Brazil".into();
    let e = engine().enrich(&p);
    assert_eq!(e.assessment.score(RiskDimension::Geographic), 1.0);
    let travel = e
        .indicators
        .iter()
        .find(|i| i.indicator_type() == IndicatorType::ImpossibleTravel)
        .expect("impossible travel indicator");
    assert_eq!(travel.contributing_factors().len(), 2);
}

#[test]
fn new_customer_high_spending() {
    let mut p = clean_profile();
    p.customer_segment = CustomerSegment::New;
    p.total_spent = 2000.0;
    assert_eq!(engine().enrich(&p).assessment.score(RiskDimension::Behavioral), 0.0);

    p.total_spent = 2000.01;
    let e = engine().enrich(&p);
    assert!((e.assessment.score(RiskDimension::Behavioral) - 0.5).abs() < 1e-12);

    p.customer_segment = CustomerSegment::Premium;
    assert_eq!(engine().enrich(&p).assessment.score(RiskDimension::Behavioral), 0.0);
}

#[test]
fn unusual_product_diversity() {
    let mut p = clean_profile();
    p.product_diversity_score = 0.95;
    p.total_orders = 5;
    let e = engine().enrich(&p);
    assert!((e.assessment.score(RiskDimension::Behavioral) - 0.3).abs() < 1e-12);

    p.total_orders = 4;
    assert_eq!(engine().enrich(&p).assessment.score(RiskDimension::Behavioral), 0.0);
}

#[test]
fn incomplete_profile_and_suspicious_email() {
    let mut p = clean_profile();
    p.profile_completeness = 0.49;
    p.email = Some("Someone@TempInbox.net".into());
    let e = engine().enrich(&p);
    assert_eq!(e.assessment.score(RiskDimension::Profile), 1.0);
    assert_eq!(
        kinds(&e),
        vec![IndicatorType::IncompleteProfile, IndicatorType::SuspiciousEmail]
    );

    p.email = Some("x@disposable.example".into());
    p.profile_completeness = 0.5;
    let e = engine().enrich(&p);
    assert!((e.assessment.score(RiskDimension::Profile) - 0.6).abs() < 1e-12);

    p.email = None;
    assert_eq!(engine().enrich(&p).assessment.score(RiskDimension::Profile), 0.0);
}

#[test]
fn amount_rules() {
    let mut p = clean_profile();
    p.avg_order_value = 1000.0;
    assert_eq!(engine().enrich(&p).assessment.score(RiskDimension::Amount), 0.0);

    p.avg_order_value = 1000.5;
    assert!((engine().enrich(&p).assessment.score(RiskDimension::Amount) - 0.4).abs() < 1e-12);

    p.total_spent = 4000.0;
    let e = engine().enrich(&p);
    assert!((e.assessment.score(RiskDimension::Amount) - 0.6).abs() < 1e-12);
    assert_eq!(
        kinds(&e),
        vec![IndicatorType::HighAverageOrder, IndicatorType::RoundNumberBias]
    );

    p.total_spent = 0.0;
    p.avg_order_value = 0.0;
    assert_eq!(engine().enrich(&p).assessment.score(RiskDimension::Amount), 0.0);
}

#[test]
fn amount_score_is_monotonic_in_order_value() {
    let mut last = 0.0;
    for step in 0..200 {
        let mut p = clean_profile();
        p.avg_order_value = 900.0 + step as f64 * 5.0;
        let score = engine().enrich(&p).assessment.score(RiskDimension::Amount);
        assert!(score >= last, "amount score fell at avg_order_value {}", p.avg_order_value);
        last = score;
    }
}

#[test]
fn off_hours_needs_a_timeline() {
    let mut p = clean_profile();
    p.customer_id = 3; // hash % 15 == 0
    let e = engine().enrich(&p);
    assert!((e.assessment.score(RiskDimension::Temporal) - 0.3).abs() < 1e-12);

    p.total_orders = 0;
    let e = engine().enrich(&p);
    assert_eq!(e.assessment.score(RiskDimension::Temporal), 0.0);
    assert!(e.timeline.is_empty());
}

#[test]
fn every_score_stays_in_bounds() {
    let engine = engine();
    for id in 0..400i64 {
        let mut p = CustomerProfile::new(id);
        p.total_orders = (id % 60) as u32;
        p.total_spent = (id * 97 % 9000) as f64;
        p.avg_order_value = (id * 31 % 2500) as f64;
        p.country = if id % 2 == 0 { "Peru".into() } else { "Canada".into() };
        p.customer_segment = if id % 3 == 0 { CustomerSegment::New } else { CustomerSegment::Premium };
        p.profile_completeness = (id % 10) as f64 / 10.0;
        p.product_diversity_score = (id % 12) as f64 / 11.0;
        p.email = Some(if id % 5 == 0 { "temp@x.io".into() } else { "ok@x.io".into() });

        let a = engine.enrich(&p).assessment;
        for d in RiskDimension::ALL {
            let s = a.score(d);
            assert!((0.0..=1.0).contains(&s), "customer {id}: {d} = {s}");
        }
        assert!((0.0..=1.0).contains(&a.composite_risk_score));
        assert!((0.5..=0.95).contains(&a.classification_confidence));
    }
}

#[test]
fn non_finite_input_omits_only_its_dimensions() {
    let mut p = clean_profile();
    p.avg_order_value = f64::NAN;
    p.profile_completeness = 0.2;
    let e = engine().enrich(&p);

    assert_eq!(e.assessment.omitted_dimensions, vec![RiskDimension::Amount]);
    assert_eq!(e.assessment.score(RiskDimension::Amount), 0.0);
    assert!((e.assessment.score(RiskDimension::Profile) - 0.4).abs() < 1e-12);
    assert_eq!(e.features.get("avg_order_value"), Some(0.0));
}

struct BrokenGeo;

impl RiskAnalyzer for BrokenGeo {
    fn dimension(&self) -> RiskDimension {
        RiskDimension::Geographic
    }

    fn analyze(&self, _ctx: &ProfileContext<'_>, _rules: &RuleConfig) -> ScoringResult<DimensionScore> {
        Err(ScoringError::AnalyzerFailed {
            dimension: RiskDimension::Geographic,
            reason: "geo service unavailable".into(),
        })
    }
}

#[test]
fn failing_analyzer_does_not_block_the_others() {
    let engine = engine().with_analyzer(Box::new(BrokenGeo));
    let mut p = clean_profile();
    p.country = "Japan".into();
    p.profile_completeness = 0.1;

    let e = engine.enrich(&p);
    assert_eq!(e.assessment.omitted_dimensions, vec![RiskDimension::Geographic]);
    assert_eq!(e.assessment.score(RiskDimension::Geographic), 0.0);
    assert!((e.assessment.score(RiskDimension::Profile) - 0.4).abs() < 1e-12);
    assert!(!kinds(&e).contains(&IndicatorType::InternationalProfile));
}
