use chrono::{DateTime, Utc};

pub type CustomerId = i64;
pub type BatchId = uuid::Uuid;
pub type Instant = DateTime<Utc>;
