//! Engine clock: the single source of "now" for a batch.

use crate::types::Instant;
use chrono::Utc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineClock {
    /// Wall-clock UTC.
    #[default]
    System,
    /// Frozen instant. Tests use this so timelines and alert ids are stable.
    Fixed(Instant),
}

impl EngineClock {
    pub fn now(&self) -> Instant {
        match self {
            Self::System => Utc::now(),
            Self::Fixed(at) => *at,
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, Self::Fixed(_))
    }
}
