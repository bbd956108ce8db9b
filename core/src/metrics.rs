//! Corpus-level metrics over one batch of enriched profiles.

use crate::{engine::EnrichedProfile, scoring::RiskLevel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LevelShare {
    pub count: usize,
    /// Percentage of the batch, 0 when the batch is empty.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchMetrics {
    pub total_customers_analyzed: usize,
    /// Always holds all four levels.
    pub risk_distribution: BTreeMap<RiskLevel, LevelShare>,
    pub average_risk_score: f64,
    pub high_risk_customers: usize,
    /// (high + critical) / total * 100.
    pub fraud_detection_rate: f64,
    /// Input records rejected before scoring.
    pub skipped_records: usize,
}

impl BatchMetrics {
    pub fn share(&self, level: RiskLevel) -> LevelShare {
        self.risk_distribution.get(&level).copied().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.total_customers_analyzed == 0
    }
}

/// Single pass over the batch. An empty batch yields zero-filled metrics.
pub fn summarize(profiles: &[EnrichedProfile], skipped_records: usize) -> BatchMetrics {
    let total = profiles.len();
    let mut counts: BTreeMap<RiskLevel, usize> = RiskLevel::ALL.iter().map(|l| (*l, 0)).collect();
    let mut score_sum = 0.0;

    for p in profiles {
        *counts.entry(p.assessment.risk_level).or_insert(0) += 1;
        score_sum += p.assessment.composite_risk_score;
    }

    if total == 0 {
        log::warn!("metrics: empty batch, reporting zero-filled summary");
    }

    let risk_distribution = counts
        .into_iter()
        .map(|(level, count)| {
            (
                level,
                LevelShare {
                    count,
                    percentage: percent(count, total),
                },
            )
        })
        .collect::<BTreeMap<_, _>>();

    let high_risk_customers = risk_distribution[&RiskLevel::High].count
        + risk_distribution[&RiskLevel::Critical].count;

    BatchMetrics {
        total_customers_analyzed: total,
        average_risk_score: if total > 0 { score_sum / total as f64 } else { 0.0 },
        high_risk_customers,
        fraud_detection_rate: percent(high_risk_customers, total),
        risk_distribution,
        skipped_records,
    }
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}
