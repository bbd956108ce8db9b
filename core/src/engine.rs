//! The risk engine: runs the full per-profile pipeline and the batch join.
//!
//! Per profile: timeline synthesis → velocity → six analyzers → composite
//! → features → alert. Profiles share nothing, so a batch is split across
//! scoped worker threads; the only serialization point is the join before
//! the metrics pass.

use crate::{
    alert::{self, FraudAlert},
    analyzer::{default_analyzers, ProfileContext, RiskAnalyzer, RiskDimension},
    clock::EngineClock,
    config::EngineConfig,
    error::{ScoringError, ScoringResult},
    features::{self, FeatureVector},
    indicator::RiskIndicator,
    metrics::{self, BatchMetrics},
    profile::CustomerProfile,
    scoring::{self, RiskAssessment},
    timeline::{self, TransactionTimeline, VelocityMetrics},
    types::{BatchId, Instant},
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// A scored customer. Created once per run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedProfile {
    #[serde(flatten)]
    pub profile: CustomerProfile,
    pub timeline: TransactionTimeline,
    pub velocity: VelocityMetrics,
    #[serde(flatten)]
    pub assessment: RiskAssessment,
    /// Emitted in dimension order, then rule order within a dimension.
    pub indicators: Vec<RiskIndicator>,
    pub features: FeatureVector,
}

/// Shared flag the collaborator flips to stop a batch before the join.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BatchStatus {
    Complete,
    /// Cancelled before every profile was scored. Outputs and metrics cover
    /// only the `processed` profiles, in input order.
    Cancelled { processed: usize, total: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: BatchId,
    pub analysis_timestamp: Instant,
    pub status: BatchStatus,
    pub profiles: Vec<EnrichedProfile>,
    pub alerts: Vec<FraudAlert>,
    pub metrics: BatchMetrics,
    pub skipped: Vec<SkippedRecord>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.status == BatchStatus::Complete
    }
}

pub struct RiskEngine {
    config: EngineConfig,
    clock: EngineClock,
    analyzers: Vec<Box<dyn RiskAnalyzer>>,
}

impl RiskEngine {
    pub fn new(config: EngineConfig) -> ScoringResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            clock: EngineClock::System,
            analyzers: default_analyzers(),
        })
    }

    /// Default configuration on a frozen clock. Used by tests and replay.
    pub fn build_test(now: Instant) -> Self {
        Self {
            config: EngineConfig::default(),
            clock: EngineClock::Fixed(now),
            analyzers: default_analyzers(),
        }
    }

    pub fn with_clock(mut self, clock: EngineClock) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the analyzer for `analyzer.dimension()`.
    pub fn with_analyzer(mut self, analyzer: Box<dyn RiskAnalyzer>) -> Self {
        let dimension = analyzer.dimension();
        match self.analyzers.iter().position(|a| a.dimension() == dimension) {
            Some(slot) => self.analyzers[slot] = analyzer,
            None => self.analyzers.push(analyzer),
        }
        self.analyzers.sort_by_key(|a| a.dimension());
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clock(&self) -> EngineClock {
        self.clock
    }

    /// Score one profile against the engine clock.
    pub fn enrich(&self, profile: &CustomerProfile) -> EnrichedProfile {
        self.enrich_at(profile, self.clock.now())
    }

    /// Score one profile with an explicit timeline anchor.
    pub fn enrich_at(&self, profile: &CustomerProfile, now: Instant) -> EnrichedProfile {
        let timeline = timeline::synthesize(
            profile.customer_id,
            profile.total_orders,
            now,
            &self.config.timeline,
        );
        let velocity = timeline::velocity(&timeline);

        let ctx = ProfileContext {
            profile,
            timeline: &timeline,
            velocity: &velocity,
        };

        let mut dimension_scores = Vec::with_capacity(self.analyzers.len());
        let mut omitted: Vec<RiskDimension> = Vec::new();
        for analyzer in &self.analyzers {
            match analyzer.analyze(&ctx, &self.config.rules) {
                Ok(ds) => dimension_scores.push(ds),
                Err(e) => {
                    log::warn!(
                        "customer={} dimension {} omitted: {e}",
                        profile.customer_id,
                        analyzer.dimension()
                    );
                    omitted.push(analyzer.dimension());
                }
            }
        }

        let assessment = scoring::assess(
            &dimension_scores,
            omitted,
            &self.config.weights,
            &self.config.thresholds,
        );
        let indicators: Vec<RiskIndicator> = dimension_scores
            .into_iter()
            .flat_map(|ds| ds.indicators)
            .collect();
        let features = features::extract(
            profile,
            &velocity,
            &assessment,
            &indicators,
            &self.config.rules,
        );

        log::debug!(
            "customer={} composite={:.4} level={} indicators={}",
            profile.customer_id,
            assessment.composite_risk_score,
            assessment.risk_level,
            indicators.len()
        );

        EnrichedProfile {
            profile: profile.clone(),
            timeline,
            velocity,
            assessment,
            indicators,
            features,
        }
    }

    /// Score raw upstream rows. Rows without a usable `customer_id` are
    /// skipped and reported; the rest of the batch carries on.
    pub fn run_batch(
        &self,
        records: &[serde_json::Value],
        cancel: &CancellationToken,
    ) -> ScoringResult<BatchReport> {
        let mut profiles = Vec::with_capacity(records.len());
        let mut skipped = Vec::new();
        for (index, record) in records.iter().enumerate() {
            let admitted = CustomerProfile::from_record(index, record)
                .and_then(|p| self.admit(index, p));
            match admitted {
                Ok(p) => profiles.push(p),
                Err(ScoringError::InvalidProfile { index, reason }) => {
                    log::warn!("record={index} skipped: {reason}");
                    skipped.push(SkippedRecord { index, reason });
                }
                Err(e) => return Err(e),
            }
        }
        self.score_batch(&profiles, skipped, cancel)
    }

    /// Score already-typed profiles. Profiles over the configured order
    /// limit are skipped the same way malformed rows are.
    pub fn analyze_profiles(
        &self,
        profiles: &[CustomerProfile],
        cancel: &CancellationToken,
    ) -> ScoringResult<BatchReport> {
        if profiles
            .iter()
            .all(|p| p.total_orders <= self.config.timeline.max_orders)
        {
            return self.score_batch(profiles, Vec::new(), cancel);
        }

        let mut admitted = Vec::with_capacity(profiles.len());
        let mut skipped = Vec::new();
        for (index, profile) in profiles.iter().enumerate() {
            match self.admit(index, profile.clone()) {
                Ok(p) => admitted.push(p),
                Err(ScoringError::InvalidProfile { index, reason }) => {
                    log::warn!("profile={index} skipped: {reason}");
                    skipped.push(SkippedRecord { index, reason });
                }
                Err(e) => return Err(e),
            }
        }
        self.score_batch(&admitted, skipped, cancel)
    }

    fn admit(&self, index: usize, profile: CustomerProfile) -> ScoringResult<CustomerProfile> {
        let limit = self.config.timeline.max_orders;
        if profile.total_orders > limit {
            return Err(ScoringError::InvalidProfile {
                index,
                reason: format!(
                    "customer {} has {} orders, limit is {limit}",
                    profile.customer_id, profile.total_orders
                ),
            });
        }
        Ok(profile)
    }

    fn score_batch(
        &self,
        profiles: &[CustomerProfile],
        skipped: Vec<SkippedRecord>,
        cancel: &CancellationToken,
    ) -> ScoringResult<BatchReport> {
        let batch_id = Uuid::new_v4();
        let now = self.clock.now();
        let total = profiles.len();
        log::info!(
            "batch={batch_id} starting fraud analysis: {total} profiles, {} skipped",
            skipped.len()
        );

        let scored = self.score_parallel(profiles, now, cancel)?;
        let processed = scored.len();

        let mut enriched = Vec::with_capacity(processed);
        let mut alerts = Vec::new();
        for (profile, alert) in scored {
            enriched.push(profile);
            alerts.extend(alert);
        }

        let status = if processed < total {
            log::warn!("batch={batch_id} cancelled after {processed}/{total} profiles");
            BatchStatus::Cancelled { processed, total }
        } else {
            BatchStatus::Complete
        };

        let metrics = metrics::summarize(&enriched, skipped.len());
        log::info!(
            "batch={batch_id} fraud analysis finished: {} high-risk, {} alerts, detection rate {:.2}%",
            metrics.high_risk_customers,
            alerts.len(),
            metrics.fraud_detection_rate
        );

        Ok(BatchReport {
            batch_id,
            analysis_timestamp: now,
            status,
            profiles: enriched,
            alerts,
            metrics,
            skipped,
        })
    }

    /// Fan out over contiguous chunks and join them back in input order.
    /// A cancelled worker stops at its next profile; the rest of its chunk
    /// is left unscored.
    fn score_parallel(
        &self,
        profiles: &[CustomerProfile],
        now: Instant,
        cancel: &CancellationToken,
    ) -> ScoringResult<Vec<(EnrichedProfile, Option<FraudAlert>)>> {
        if profiles.is_empty() {
            return Ok(Vec::new());
        }

        let workers = self.worker_count().min(profiles.len());
        let chunk_size = profiles.len().div_ceil(workers);

        std::thread::scope(|scope| {
            let handles: Vec<_> = profiles
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        let mut out = Vec::with_capacity(chunk.len());
                        for profile in chunk {
                            if cancel.is_cancelled() {
                                break;
                            }
                            let enriched = self.enrich_at(profile, now);
                            let alert = alert::generate(&enriched, now, &self.config.priorities);
                            out.push((enriched, alert));
                        }
                        out
                    })
                })
                .collect();

            let mut joined = Vec::with_capacity(profiles.len());
            for (worker, handle) in handles.into_iter().enumerate() {
                match handle.join() {
                    Ok(part) => joined.extend(part),
                    Err(_) => return Err(ScoringError::WorkerPanicked { worker }),
                }
            }
            Ok(joined)
        })
    }

    fn worker_count(&self) -> usize {
        match self.config.worker_threads {
            0 => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            n => n,
        }
    }
}
