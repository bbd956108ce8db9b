//! Synthesized transaction timelines and the velocity metrics derived
//! from them.
//!
//! Upstream order data carries no timestamps, so each customer gets a
//! plausible chronology generated from their id and order count.
//! Same (customer_id, total_orders, anchor) ⇒ byte-identical timeline.

use crate::{
    config::TimelineConfig,
    rng::TimelineRng,
    types::{CustomerId, Instant},
};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const SECONDS_PER_DAY: f64 = 86_400.0;
const SECONDS_PER_HOUR: f64 = 3_600.0;

/// Ascending sequence of synthesized transaction instants.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransactionTimeline {
    instants: Vec<Instant>,
}

impl TransactionTimeline {
    pub fn instants(&self) -> &[Instant] {
        &self.instants
    }

    pub fn len(&self) -> usize {
        self.instants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instants.is_empty()
    }

    pub fn first_transaction(&self) -> Option<Instant> {
        self.instants.first().copied()
    }

    pub fn last_transaction(&self) -> Option<Instant> {
        self.instants.last().copied()
    }
}

/// Generate `total_orders` instants inside the lookback window ending at
/// `now`.
///
/// Order `i` sits `Exp(lookback / total_orders) * i` days into the window
/// (clamped to the last whole day), so later orders spread out and a tail
/// of them piles up on the final day. Each order gets an hour drawn
/// uniformly from the business-hours window.
///
/// At most `config.max_orders` instants are generated; batches reject
/// larger profiles before they get here.
pub fn synthesize(
    customer_id: CustomerId,
    total_orders: u32,
    now: Instant,
    config: &TimelineConfig,
) -> TransactionTimeline {
    let total_orders = total_orders.min(config.max_orders);
    if total_orders == 0 {
        return TransactionTimeline::default();
    }

    let lookback = f64::from(config.lookback_days);
    let max_day_offset = (lookback - 1.0).max(0.0);
    let scale = lookback / f64::from(total_orders);
    let base = now - Duration::days(i64::from(config.lookback_days));
    let mut rng = TimelineRng::for_customer(customer_id);

    let mut instants: Vec<Instant> = (0..total_orders)
        .map(|i| {
            let day_offset = (rng.exponential(scale) * f64::from(i)).clamp(0.0, max_day_offset);
            let hour_offset = rng.uniform(config.hour_window_start, config.hour_window_end);
            base + Duration::seconds((day_offset * SECONDS_PER_DAY) as i64)
                + Duration::seconds((hour_offset * SECONDS_PER_HOUR) as i64)
        })
        .collect();
    instants.sort();

    TransactionTimeline { instants }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VelocityMetrics {
    /// Most transactions on any single UTC date.
    pub max_daily: u32,
    /// Mean transactions per active UTC date.
    pub avg_daily: f64,
}

pub fn velocity(timeline: &TransactionTimeline) -> VelocityMetrics {
    let mut per_day: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for instant in timeline.instants() {
        *per_day.entry(instant.date_naive()).or_insert(0) += 1;
    }
    if per_day.is_empty() {
        return VelocityMetrics::default();
    }

    let max_daily = per_day.values().copied().max().unwrap_or(0);
    let total: u32 = per_day.values().sum();
    VelocityMetrics {
        max_daily,
        avg_daily: f64::from(total) / per_day.len() as f64,
    }
}
