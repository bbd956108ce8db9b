//! SQLite persistence for scoring batches.
//!
//! RULE: Only store.rs talks to the database.
//! The engine never persists anything itself; the runner hands a finished
//! BatchReport to `save_report`.

use crate::{
    analyzer::RiskDimension,
    engine::{BatchReport, BatchStatus},
    error::ScoringResult,
    types::CustomerId,
};
use rusqlite::{params, Connection, OptionalExtension};

pub struct ScoreStore {
    conn: Connection,
}

/// One persisted `risk_score` row.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRiskScore {
    pub customer_id: CustomerId,
    pub composite_risk_score: f64,
    pub risk_level: String,
    pub velocity_risk: f64,
    pub geographic_risk: f64,
    pub behavioral_risk: f64,
    pub profile_risk: f64,
    pub amount_risk: f64,
    pub temporal_risk: f64,
    pub indicators_json: String,
    pub features_json: String,
}

/// One persisted `risk_run` row.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRun {
    pub batch_id: String,
    pub status: String,
    pub total_analyzed: i64,
    pub skipped_records: i64,
    pub high_risk_customers: i64,
    pub detection_rate: f64,
}

impl ScoreStore {
    /// Open (or create) the score database at `path`.
    pub fn open(path: &str) -> ScoringResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> ScoringResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> ScoringResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_risk_scores.sql"))?;
        Ok(())
    }

    // ── Batches ────────────────────────────────────────────────

    /// Persist a whole report atomically. Saving the same batch twice
    /// replaces the earlier rows.
    pub fn save_report(&self, report: &BatchReport) -> ScoringResult<()> {
        let batch_id = report.batch_id.to_string();
        let tx = self.conn.unchecked_transaction()?;

        tx.execute("DELETE FROM risk_run WHERE batch_id = ?1", params![batch_id])?;

        let status = match report.status {
            BatchStatus::Complete => "complete",
            BatchStatus::Cancelled { .. } => "cancelled",
        };
        let m = &report.metrics;
        tx.execute(
            "INSERT INTO risk_run (
                batch_id, analyzed_at, status, total_analyzed, skipped_records,
                average_risk_score, high_risk_customers, detection_rate, metrics_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                batch_id,
                report.analysis_timestamp.to_rfc3339(),
                status,
                m.total_customers_analyzed as i64,
                m.skipped_records as i64,
                m.average_risk_score,
                m.high_risk_customers as i64,
                m.fraud_detection_rate,
                serde_json::to_string(m)?,
            ],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO risk_score (
                    batch_id, customer_id, composite_risk_score, risk_level,
                    velocity_risk, geographic_risk, behavioral_risk,
                    profile_risk, amount_risk, temporal_risk, confidence,
                    indicators_json, features_json
                ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13)",
            )?;
            for p in &report.profiles {
                let a = &p.assessment;
                stmt.execute(params![
                    batch_id,
                    p.profile.customer_id,
                    a.composite_risk_score,
                    a.risk_level.as_str(),
                    a.score(RiskDimension::Velocity),
                    a.score(RiskDimension::Geographic),
                    a.score(RiskDimension::Behavioral),
                    a.score(RiskDimension::Profile),
                    a.score(RiskDimension::Amount),
                    a.score(RiskDimension::Temporal),
                    a.classification_confidence,
                    serde_json::to_string(&p.indicators)?,
                    serde_json::to_string(&p.features)?,
                ])?;
            }

            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO fraud_alert (
                    alert_id, batch_id, customer_id, customer_name, risk_level,
                    risk_score, primary_indicators_json, recommended_action,
                    investigation_priority, alert_timestamp
                ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)",
            )?;
            for alert in &report.alerts {
                stmt.execute(params![
                    alert.alert_id,
                    batch_id,
                    alert.customer_id,
                    alert.customer_name,
                    alert.risk_level.as_str(),
                    alert.risk_score,
                    serde_json::to_string(&alert.primary_indicators)?,
                    alert.recommended_action.as_str(),
                    alert.investigation_priority.as_str(),
                    alert.alert_timestamp.to_rfc3339(),
                ])?;
            }
        }

        tx.commit()?;
        log::debug!(
            "batch={batch_id} saved: {} scores, {} alerts",
            report.profiles.len(),
            report.alerts.len()
        );
        Ok(())
    }

    pub fn get_run(&self, batch_id: &str) -> ScoringResult<Option<StoredRun>> {
        let run = self
            .conn
            .query_row(
                "SELECT batch_id, status, total_analyzed, skipped_records,
                        high_risk_customers, detection_rate
                 FROM risk_run WHERE batch_id = ?1",
                params![batch_id],
                |row| {
                    Ok(StoredRun {
                        batch_id: row.get(0)?,
                        status: row.get(1)?,
                        total_analyzed: row.get(2)?,
                        skipped_records: row.get(3)?,
                        high_risk_customers: row.get(4)?,
                        detection_rate: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(run)
    }

    // ── Scores ─────────────────────────────────────────────────

    pub fn risk_score_count(&self, batch_id: &str) -> ScoringResult<i64> {
        let n = self.conn.query_row(
            "SELECT COUNT(*) FROM risk_score WHERE batch_id = ?1",
            params![batch_id],
            |row| row.get(0),
        )?;
        Ok(n)
    }

    pub fn get_risk_score(
        &self,
        batch_id: &str,
        customer_id: CustomerId,
    ) -> ScoringResult<Option<StoredRiskScore>> {
        let score = self
            .conn
            .query_row(
                "SELECT customer_id, composite_risk_score, risk_level,
                        velocity_risk, geographic_risk, behavioral_risk,
                        profile_risk, amount_risk, temporal_risk,
                        indicators_json, features_json
                 FROM risk_score WHERE batch_id = ?1 AND customer_id = ?2",
                params![batch_id, customer_id],
                |row| {
                    Ok(StoredRiskScore {
                        customer_id: row.get(0)?,
                        composite_risk_score: row.get(1)?,
                        risk_level: row.get(2)?,
                        velocity_risk: row.get(3)?,
                        geographic_risk: row.get(4)?,
                        behavioral_risk: row.get(5)?,
                        profile_risk: row.get(6)?,
                        amount_risk: row.get(7)?,
                        temporal_risk: row.get(8)?,
                        indicators_json: row.get(9)?,
                        features_json: row.get(10)?,
                    })
                },
            )
            .optional()?;
        Ok(score)
    }

    // ── Alerts ─────────────────────────────────────────────────

    pub fn alert_count(&self, batch_id: &str) -> ScoringResult<i64> {
        let n = self.conn.query_row(
            "SELECT COUNT(*) FROM fraud_alert WHERE batch_id = ?1",
            params![batch_id],
            |row| row.get(0),
        )?;
        Ok(n)
    }

    pub fn alert_ids(&self, batch_id: &str) -> ScoringResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT alert_id FROM fraud_alert WHERE batch_id = ?1 ORDER BY customer_id ASC",
        )?;
        let ids = stmt
            .query_map(params![batch_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }
}
