use crate::analyzer::RiskDimension;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("Invalid profile at record {index}: {reason}")]
    InvalidProfile { index: usize, reason: String },

    #[error("Analyzer '{dimension}' failed: {reason}")]
    AnalyzerFailed { dimension: RiskDimension, reason: String },

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("Scoring worker {worker} panicked")]
    WorkerPanicked { worker: usize },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ScoringResult<T> = Result<T, ScoringError>;
