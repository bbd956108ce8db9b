//! Batch runs over raw rows: skipping, alerting, metrics and cancellation.

use chrono::{TimeZone, Utc};
use riskscore_core::{
    alert::{InvestigationPriority, RecommendedAction},
    analyzer::{DimensionScore, ProfileContext, RiskAnalyzer, RiskDimension, ScoreBuilder},
    clock::EngineClock,
    config::{EngineConfig, RiskWeights, RuleConfig},
    engine::{BatchStatus, CancellationToken, RiskEngine},
    error::ScoringResult,
    indicator::IndicatorType,
    profile::CustomerProfile,
    scoring::RiskLevel,
    types::Instant,
};
use serde_json::{json, Value};

fn now() -> Instant {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn sample_rows() -> Vec<Value> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../data/sample_profiles.json");
    let content = std::fs::read_to_string(path).expect("sample profiles present");
    serde_json::from_str(&content).expect("sample profiles parse")
}

fn high_risk_row() -> Value {
    json!({
        "customer_id": 742,
        "full_name": "Michael Williams",
        "total_orders": 200,
        "total_spent": 250000.0,
        "avg_order_value": 1250.0,
        "country": "Brazil",
        "customer_segment": "new",
        "profile_completeness": 0.3,
        "product_diversity_score": 0.95,
        "email": "buyer@tempmail.io"
    })
}

#[test]
fn empty_batch_reports_zero_metrics() {
    let _ = env_logger::builder().is_test(true).try_init();
    let report = RiskEngine::build_test(now())
        .run_batch(&[], &CancellationToken::new())
        .unwrap();

    assert!(report.is_complete());
    assert!(report.profiles.is_empty());
    assert!(report.alerts.is_empty());
    assert!(report.metrics.is_empty());
    assert_eq!(report.metrics.average_risk_score, 0.0);
    assert_eq!(report.metrics.fraud_detection_rate, 0.0);
    for level in RiskLevel::ALL {
        assert_eq!(report.metrics.share(level).count, 0);
        assert_eq!(report.metrics.share(level).percentage, 0.0);
    }
}

#[test]
fn sample_batch_skips_the_row_without_an_id() {
    let rows = sample_rows();
    let report = RiskEngine::build_test(now())
        .run_batch(&rows, &CancellationToken::new())
        .unwrap();

    assert_eq!(report.profiles.len(), rows.len() - 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].index, 4);
    assert_eq!(report.metrics.skipped_records, 1);

    let ids: Vec<i64> = report.profiles.iter().map(|p| p.profile.customer_id).collect();
    assert_eq!(ids, vec![42, 742, 7, 2]);
}

#[test]
fn sample_batch_metrics() {
    let report = RiskEngine::build_test(now())
        .run_batch(&sample_rows(), &CancellationToken::new())
        .unwrap();
    let m = &report.metrics;

    assert_eq!(m.total_customers_analyzed, 4);
    assert_eq!(m.high_risk_customers, 1);
    assert!((m.fraud_detection_rate - 25.0).abs() < 1e-9);
    assert_eq!(m.share(RiskLevel::Low).count, 3);
    assert!((m.share(RiskLevel::Low).percentage - 75.0).abs() < 1e-9);
    assert_eq!(m.share(RiskLevel::High).count, 1);
    assert_eq!(m.share(RiskLevel::Critical).count, 0);
    assert!((m.average_risk_score - (0.24 + 0.85) / 4.0).abs() < 1e-9);

    let pct: f64 = RiskLevel::ALL.iter().map(|l| m.share(*l).percentage).sum();
    assert!((pct - 100.0).abs() < 1e-9);
}

#[test]
fn high_risk_profile_raises_a_priority_alert() {
    let report = RiskEngine::build_test(now())
        .run_batch(&[high_risk_row()], &CancellationToken::new())
        .unwrap();

    let scored = &report.profiles[0];
    assert!((scored.assessment.composite_risk_score - 0.85).abs() < 1e-9);
    assert_eq!(scored.assessment.risk_level, RiskLevel::High);

    assert_eq!(report.alerts.len(), 1);
    let alert = &report.alerts[0];
    assert_eq!(alert.alert_id, format!("FRAUD_742_{}", now().timestamp()));
    assert_eq!(alert.customer_name, "Michael Williams");
    assert_eq!(alert.risk_level, RiskLevel::High);
    assert_eq!(alert.investigation_priority, InvestigationPriority::P2High);
    assert_eq!(alert.recommended_action, RecommendedAction::PriorityReview);
    assert_eq!(
        alert.primary_indicators,
        vec![
            IndicatorType::HighVelocity,
            IndicatorType::BurstPattern,
            IndicatorType::InternationalProfile,
        ]
    );
    assert_eq!(alert.alert_timestamp, now());
}

#[test]
fn medium_profile_gets_no_alert() {
    let mut row = high_risk_row();
    row["email"] = Value::Null;
    row["profile_completeness"] = json!(0.9);

    let report = RiskEngine::build_test(now())
        .run_batch(&[row], &CancellationToken::new())
        .unwrap();
    let scored = &report.profiles[0];
    assert!((scored.assessment.composite_risk_score - 0.70).abs() < 1e-9);
    assert_eq!(scored.assessment.risk_level, RiskLevel::Medium);
    assert!(report.alerts.is_empty());
    assert_eq!(report.metrics.high_risk_customers, 0);
}

#[test]
fn alert_falls_back_to_unknown_name() {
    let mut row = high_risk_row();
    row.as_object_mut().unwrap().remove("full_name");
    let report = RiskEngine::build_test(now())
        .run_batch(&[row], &CancellationToken::new())
        .unwrap();
    assert_eq!(report.alerts[0].customer_name, "Unknown");
}

#[test]
fn reweighted_engine_reaches_critical() {
    let config = EngineConfig {
        weights: RiskWeights {
            velocity: 0.5,
            geographic: 0.5,
            behavioral: 0.0,
            profile: 0.0,
            amount: 0.0,
            temporal: 0.0,
        },
        ..EngineConfig::default()
    };
    let engine = RiskEngine::new(config)
        .unwrap()
        .with_clock(EngineClock::Fixed(now()));
    let report = engine
        .run_batch(&[high_risk_row()], &CancellationToken::new())
        .unwrap();

    let alert = &report.alerts[0];
    assert_eq!(alert.risk_level, RiskLevel::Critical);
    assert!((alert.risk_score - 1.0).abs() < 1e-9);
    assert_eq!(alert.investigation_priority, InvestigationPriority::P1Urgent);
    assert_eq!(
        alert.recommended_action,
        RecommendedAction::ImmediateInvestigationRequired
    );
}

#[test]
fn default_weights_cannot_reach_critical() {
    // Every analyzer saturated except temporal, which tops out at 0.3.
    let report = RiskEngine::build_test(now())
        .run_batch(&[high_risk_row()], &CancellationToken::new())
        .unwrap();
    assert!(report.profiles[0].assessment.composite_risk_score < 0.9);
}

#[test]
fn cancelled_before_start_scores_nothing() {
    let rows = sample_rows();
    let token = CancellationToken::new();
    token.cancel();

    let report = RiskEngine::build_test(now()).run_batch(&rows, &token).unwrap();
    assert_eq!(report.status, BatchStatus::Cancelled { processed: 0, total: 4 });
    assert!(!report.is_complete());
    assert!(report.profiles.is_empty());
    assert!(report.alerts.is_empty());
    assert_eq!(report.metrics.total_customers_analyzed, 0);
    assert_eq!(report.metrics.skipped_records, 1);
}

#[test]
fn typed_profiles_skip_ingestion() {
    let profiles: Vec<CustomerProfile> = (1..=3).map(CustomerProfile::new).collect();
    let report = RiskEngine::build_test(now())
        .analyze_profiles(&profiles, &CancellationToken::new())
        .unwrap();
    assert!(report.is_complete());
    assert_eq!(report.profiles.len(), 3);
    assert!(report.skipped.is_empty());
    assert_eq!(report.analysis_timestamp, now());
}

#[test]
fn report_serializes_status_and_alerts() {
    let report = RiskEngine::build_test(now())
        .run_batch(&[high_risk_row()], &CancellationToken::new())
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["status"]["state"], "complete");
    assert_eq!(json["alerts"][0]["investigation_priority"], "P2_HIGH");
    assert_eq!(json["alerts"][0]["primary_indicators"][0], "HIGH_VELOCITY");
    assert_eq!(json["profiles"][0]["risk_level"], "high");
}

/// Stands in for the temporal analyzer and flips the token while scoring
/// one chosen customer, so cancellation lands mid-batch.
struct CancelOn {
    customer_id: i64,
    token: CancellationToken,
}

impl RiskAnalyzer for CancelOn {
    fn dimension(&self) -> RiskDimension {
        RiskDimension::Temporal
    }

    fn analyze(&self, ctx: &ProfileContext<'_>, _rules: &RuleConfig) -> ScoringResult<DimensionScore> {
        if ctx.profile.customer_id == self.customer_id {
            self.token.cancel();
        }
        Ok(ScoreBuilder::new(RiskDimension::Temporal).finish())
    }
}

fn cancelling_engine(workers: usize, token: &CancellationToken) -> RiskEngine {
    RiskEngine::new(EngineConfig { worker_threads: workers, ..EngineConfig::default() })
        .unwrap()
        .with_clock(EngineClock::Fixed(now()))
        .with_analyzer(Box::new(CancelOn { customer_id: 3, token: token.clone() }))
}

#[test]
fn cancelled_mid_batch_keeps_the_completed_prefix() {
    let profiles: Vec<CustomerProfile> = (1..=10).map(CustomerProfile::new).collect();
    let token = CancellationToken::new();

    let report = cancelling_engine(1, &token)
        .analyze_profiles(&profiles, &token)
        .unwrap();

    assert_eq!(report.status, BatchStatus::Cancelled { processed: 3, total: 10 });
    assert_eq!(report.profiles.len(), 3);
    assert_eq!(report.metrics.total_customers_analyzed, 3);
    let ids: Vec<i64> = report.profiles.iter().map(|p| p.profile.customer_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn cancelled_chunked_batch_is_input_ordered_but_not_a_prefix() {
    // Two workers own [1..=5] and [6..=10]. The first stops right after 3;
    // the second may have scored any leading run of its own chunk.
    let profiles: Vec<CustomerProfile> = (1..=10).map(CustomerProfile::new).collect();
    let token = CancellationToken::new();

    let report = cancelling_engine(2, &token)
        .analyze_profiles(&profiles, &token)
        .unwrap();

    let processed = report.profiles.len();
    assert_eq!(report.status, BatchStatus::Cancelled { processed, total: 10 });
    assert_eq!(report.metrics.total_customers_analyzed, processed);

    let ids: Vec<i64> = report.profiles.iter().map(|p| p.profile.customer_id).collect();
    assert_eq!(&ids[..3], &[1, 2, 3], "first chunk should stop after customer 3");
    let rest = &ids[3..];
    let second_chunk: Vec<i64> = (6..=10).collect();
    assert_eq!(rest, &second_chunk[..rest.len()], "second chunk out of order: {ids:?}");
}

#[test]
fn oversized_order_count_is_skipped() {
    let mut huge = high_risk_row();
    huge["customer_id"] = json!(9001);
    huge["total_orders"] = json!(4e9);

    let report = RiskEngine::build_test(now())
        .run_batch(&[high_risk_row(), huge], &CancellationToken::new())
        .unwrap();

    assert!(report.is_complete());
    assert_eq!(report.profiles.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].index, 1);
    assert!(report.skipped[0].reason.contains("limit"), "{}", report.skipped[0].reason);
    assert_eq!(report.metrics.skipped_records, 1);
}

#[test]
fn typed_profile_over_the_order_limit_is_skipped() {
    let config = EngineConfig::default();
    let limit = config.timeline.max_orders;
    let mut big = CustomerProfile::new(11);
    big.total_orders = limit + 1;
    let mut at_limit = CustomerProfile::new(12);
    at_limit.total_orders = 40;

    let report = RiskEngine::new(config)
        .unwrap()
        .with_clock(EngineClock::Fixed(now()))
        .analyze_profiles(&[big, at_limit], &CancellationToken::new())
        .unwrap();

    let ids: Vec<i64> = report.profiles.iter().map(|p| p.profile.customer_id).collect();
    assert_eq!(ids, vec![12]);
    assert_eq!(report.skipped[0].index, 0);
    assert_eq!(report.metrics.skipped_records, 1);
}
