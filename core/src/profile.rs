//! Customer profile input records.
//!
//! Profiles arrive from the upstream pipeline as loosely typed JSON rows.
//! `from_record` is the only place that interprets them: a missing or
//! malformed optional field becomes its zero value, a missing
//! `customer_id` rejects the row.

use crate::{
    error::{ScoringError, ScoringResult},
    types::CustomerId,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerSegment {
    #[default]
    New,
    Returning,
    Premium,
}

impl CustomerSegment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Returning => "returning",
            Self::Premium => "premium",
        }
    }

    /// Unknown labels fall back to `New`, matching an absent segment.
    pub fn parse_lenient(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "returning" => Self::Returning,
            "premium" => Self::Premium,
            _ => Self::New,
        }
    }
}

impl fmt::Display for CustomerSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub customer_id: CustomerId,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub total_orders: u32,
    #[serde(default)]
    pub total_spent: f64,
    #[serde(default)]
    pub avg_order_value: f64,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub customer_segment: CustomerSegment,
    #[serde(default)]
    pub profile_completeness: f64,
    #[serde(default)]
    pub product_diversity_score: f64,
    #[serde(default)]
    pub customer_activity_score: f64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
}

impl CustomerProfile {
    /// A profile with only an id; every other field at its zero value.
    pub fn new(customer_id: CustomerId) -> Self {
        Self {
            customer_id,
            full_name: None,
            total_orders: 0,
            total_spent: 0.0,
            avg_order_value: 0.0,
            country: String::new(),
            customer_segment: CustomerSegment::New,
            profile_completeness: 0.0,
            product_diversity_score: 0.0,
            customer_activity_score: 0.0,
            email: None,
            age: None,
        }
    }

    /// Interpret one upstream row. `index` is the row's position in the
    /// batch and is only used for error reporting.
    pub fn from_record(index: usize, record: &Value) -> ScoringResult<Self> {
        let row = record.as_object().ok_or_else(|| ScoringError::InvalidProfile {
            index,
            reason: "record is not a JSON object".into(),
        })?;

        let customer_id = customer_id_of(row).ok_or_else(|| ScoringError::InvalidProfile {
            index,
            reason: "missing or unusable customer_id".into(),
        })?;

        let total_orders = number(row, "total_orders").max(0.0).min(u32::MAX as f64) as u32;
        let age = match number(row, "age") {
            a if a > 0.0 => Some(a.min(u32::MAX as f64) as u32),
            _ => None,
        };

        Ok(Self {
            customer_id,
            full_name: text(row, "full_name"),
            total_orders,
            total_spent: number(row, "total_spent"),
            avg_order_value: number(row, "avg_order_value"),
            country: text(row, "country").unwrap_or_default(),
            customer_segment: text(row, "customer_segment")
                .map(|s| CustomerSegment::parse_lenient(&s))
                .unwrap_or_default(),
            profile_completeness: number(row, "profile_completeness"),
            product_diversity_score: number(row, "product_diversity_score"),
            customer_activity_score: number(row, "customer_activity_score"),
            email: text(row, "email"),
            age,
        })
    }

    pub fn email_or_empty(&self) -> &str {
        self.email.as_deref().unwrap_or("")
    }
}

fn customer_id_of(row: &Map<String, Value>) -> Option<CustomerId> {
    match row.get("customer_id")? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Numeric field, accepting numbers or numeric strings. Anything else is 0.
fn number(row: &Map<String, Value>, key: &str) -> f64 {
    let parsed = match row.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn text(row: &Map<String, Value>, key: &str) -> Option<String> {
    match row.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}
