use crate::{
    analyzer::RiskDimension,
    error::{ScoringError, ScoringResult},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

// ── Composite weights ──────────────────────────────────────────────

/// Per-dimension weights for the composite score. Must sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskWeights {
    pub velocity: f64,
    pub geographic: f64,
    pub behavioral: f64,
    pub profile: f64,
    pub amount: f64,
    pub temporal: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            velocity: 0.25,
            geographic: 0.20,
            behavioral: 0.20,
            profile: 0.15,
            amount: 0.10,
            temporal: 0.10,
        }
    }
}

impl RiskWeights {
    pub fn weight(&self, dimension: RiskDimension) -> f64 {
        match dimension {
            RiskDimension::Velocity => self.velocity,
            RiskDimension::Geographic => self.geographic,
            RiskDimension::Behavioral => self.behavioral,
            RiskDimension::Profile => self.profile,
            RiskDimension::Amount => self.amount,
            RiskDimension::Temporal => self.temporal,
        }
    }

    pub fn total(&self) -> f64 {
        RiskDimension::ALL.iter().map(|d| self.weight(*d)).sum()
    }
}

// ── Thresholds ─────────────────────────────────────────────────────

/// Lower bounds of each risk level; below `medium` is low.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            medium: 0.6,
            high: 0.8,
            critical: 0.9,
        }
    }
}

/// Composite-score cut-offs for investigation priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityThresholds {
    pub p1_urgent: f64,
    pub p2_high: f64,
    pub p3_medium: f64,
}

impl Default for PriorityThresholds {
    fn default() -> Self {
        Self {
            p1_urgent: 0.9,
            p2_high: 0.8,
            p3_medium: 0.6,
        }
    }
}

// ── Timeline synthesis ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Length of the synthesized window, in days.
    pub lookback_days: u32,
    /// First hour of the business-hours window (inclusive).
    pub hour_window_start: f64,
    /// Last hour of the business-hours window (exclusive).
    pub hour_window_end: f64,
    /// Largest `total_orders` a batch will synthesize a timeline for.
    /// Larger profiles are skipped as invalid.
    pub max_orders: u32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            lookback_days: 90,
            hour_window_start: 6.0,
            hour_window_end: 22.0,
            max_orders: 100_000,
        }
    }
}

// ── Analyzer rules ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    // Velocity
    pub high_velocity_daily: u32,
    pub high_velocity_weight: f64,
    pub burst_min_orders: u32,
    pub burst_hash_modulus: u64,
    pub burst_weight: f64,

    // Geographic
    pub domestic_countries: Vec<String>,
    pub international_weight: f64,
    pub impossible_travel_hash_modulus: u64,
    pub impossible_travel_weight: f64,

    // Behavioral
    pub new_customer_spend_threshold: f64,
    pub new_customer_spend_weight: f64,
    pub diversity_threshold: f64,
    pub diversity_min_orders: u32,
    pub diversity_weight: f64,

    // Profile
    pub completeness_threshold: f64,
    pub incomplete_profile_weight: f64,
    pub suspicious_email_markers: Vec<String>,
    pub suspicious_email_weight: f64,

    // Amount
    pub high_average_order: f64,
    pub high_average_order_weight: f64,
    pub round_number_unit: f64,
    pub round_number_weight: f64,

    // Temporal
    pub off_hours_hash_modulus: u64,
    pub off_hours_weight: f64,

    /// Countries the `is_international` feature treats as home markets.
    pub feature_home_countries: Vec<String>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            high_velocity_daily: 5,
            high_velocity_weight: 0.6,
            burst_min_orders: 10,
            burst_hash_modulus: 20,
            burst_weight: 0.4,

            domestic_countries: vec![
                "united states".into(),
                "canada".into(),
                "united kingdom".into(),
            ],
            international_weight: 0.3,
            impossible_travel_hash_modulus: 25,
            impossible_travel_weight: 0.7,

            new_customer_spend_threshold: 2000.0,
            new_customer_spend_weight: 0.5,
            diversity_threshold: 0.9,
            diversity_min_orders: 5,
            diversity_weight: 0.3,

            completeness_threshold: 0.5,
            incomplete_profile_weight: 0.4,
            suspicious_email_markers: vec!["temp".into(), "disposable".into()],
            suspicious_email_weight: 0.6,

            high_average_order: 1000.0,
            high_average_order_weight: 0.4,
            round_number_unit: 100.0,
            round_number_weight: 0.2,

            off_hours_hash_modulus: 15,
            off_hours_weight: 0.3,

            feature_home_countries: vec!["united states".into(), "canada".into()],
        }
    }
}

impl RuleConfig {
    pub fn is_domestic(&self, country: &str) -> bool {
        contains_ignore_case(&self.domestic_countries, country)
    }

    pub fn is_feature_home(&self, country: &str) -> bool {
        contains_ignore_case(&self.feature_home_countries, country)
    }
}

fn contains_ignore_case(set: &[String], value: &str) -> bool {
    let value = value.trim().to_lowercase();
    set.iter().any(|c| c.to_lowercase() == value)
}

// ── Engine config ──────────────────────────────────────────────────

/// Immutable engine configuration, handed to `RiskEngine::new`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: RiskWeights,
    pub thresholds: RiskThresholds,
    pub priorities: PriorityThresholds,
    pub timeline: TimelineConfig,
    pub rules: RuleConfig,
    /// Worker threads for batch scoring. 0 = use available parallelism.
    pub worker_threads: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: RiskWeights::default(),
            thresholds: RiskThresholds::default(),
            priorities: PriorityThresholds::default(),
            timeline: TimelineConfig::default(),
            rules: RuleConfig::default(),
            worker_threads: 0,
        }
    }
}

impl EngineConfig {
    /// Load a JSON config file. Missing keys fall back to the defaults.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        let config: EngineConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {}: {e}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ScoringResult<()> {
        let total = self.weights.total();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ScoringError::InvalidConfig(format!(
                "dimension weights sum to {total}, expected 1.0"
            )));
        }
        if let Some(d) = RiskDimension::ALL
            .iter()
            .find(|d| self.weights.weight(**d) < 0.0)
        {
            return Err(ScoringError::InvalidConfig(format!(
                "weight for {d} is negative"
            )));
        }

        let t = &self.thresholds;
        if !(0.0 <= t.medium && t.medium <= t.high && t.high <= t.critical && t.critical <= 1.0) {
            return Err(ScoringError::InvalidConfig(format!(
                "risk thresholds must satisfy 0 <= medium <= high <= critical <= 1, got {t:?}"
            )));
        }
        let p = &self.priorities;
        if !(p.p3_medium <= p.p2_high && p.p2_high <= p.p1_urgent) {
            return Err(ScoringError::InvalidConfig(format!(
                "priority thresholds must be non-decreasing, got {p:?}"
            )));
        }

        let tl = &self.timeline;
        if tl.lookback_days == 0 {
            return Err(ScoringError::InvalidConfig("lookback_days must be > 0".into()));
        }
        if tl.max_orders == 0 {
            return Err(ScoringError::InvalidConfig("max_orders must be > 0".into()));
        }
        if !(0.0 <= tl.hour_window_start && tl.hour_window_start < tl.hour_window_end
            && tl.hour_window_end <= 24.0)
        {
            return Err(ScoringError::InvalidConfig(format!(
                "hour window [{}, {}) is not inside a day",
                tl.hour_window_start, tl.hour_window_end
            )));
        }
        Ok(())
    }
}
