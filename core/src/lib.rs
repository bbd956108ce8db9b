//! Customer risk scoring engine.
//!
//! Takes customer profiles (demographics plus aggregated order statistics),
//! scores six independent risk dimensions, and produces a composite score,
//! a risk level, explainable indicators, a feature vector and, for high and
//! critical customers, a fraud alert.

pub mod alert;
pub mod analyzer;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod hash;
pub mod indicator;
pub mod metrics;
pub mod profile;
pub mod rng;
pub mod scoring;
pub mod store;
pub mod timeline;
pub mod types;

pub mod amount_analyzer;
pub mod behavioral_analyzer;
pub mod geographic_analyzer;
pub mod profile_analyzer;
pub mod temporal_analyzer;
pub mod velocity_analyzer;
