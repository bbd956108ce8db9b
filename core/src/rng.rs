//! Deterministic random number generation.
//!
//! RULE: Nothing in the engine may call any platform RNG.
//! Every synthesized timeline draws from a TimelineRng seeded with the
//! customer id alone, so the same customer always gets the same stream
//! regardless of batch order, worker count or platform.

use crate::types::CustomerId;
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A deterministic RNG stream for a single customer.
pub struct TimelineRng {
    pub customer_id: CustomerId,
    inner: Pcg64Mcg,
}

impl TimelineRng {
    /// Seed from the customer id. Negative ids reinterpret their bits.
    pub fn for_customer(customer_id: CustomerId) -> Self {
        Self {
            customer_id,
            inner: Pcg64Mcg::seed_from_u64(customer_id as u64),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Uniform float in [low, high).
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + self.next_f64() * (high - low)
    }

    /// Sample an exponential distribution with the given scale (mean),
    /// by inverse CDF. `1 - u` is in (0, 1], so the log is finite.
    pub fn exponential(&mut self, scale: f64) -> f64 {
        let u = self.next_f64();
        -scale * (1.0 - u).ln()
    }
}
