//! Stable identifier hashing for the synthetic anomaly signals.
//!
//! RULE: never use `std::hash::Hash` / `DefaultHasher` here. Its output is
//! not guaranteed across Rust releases, so the anomaly triggers would drift.
//!
//! The hash is 64-bit FNV-1a over the ASCII decimal rendering of the
//! customer id (`42` hashes the bytes `b"42"`).

use crate::types::CustomerId;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a 64 over raw bytes.
pub fn fnv1a_64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

pub fn customer_hash(customer_id: CustomerId) -> u64 {
    fnv1a_64(customer_id.to_string().as_bytes())
}

/// True when the customer's hash lands on a multiple of `modulus`.
/// A zero modulus never triggers.
pub fn hash_triggers(customer_id: CustomerId, modulus: u64) -> bool {
    modulus != 0 && customer_hash(customer_id) % modulus == 0
}
