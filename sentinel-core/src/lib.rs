// sentinel-core/src/lib.rs

#![allow(missing_docs)]
// Memory safety
#![deny(unsafe_code)]
// Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// Contracts with the outside world (run history, template rendering).
pub mod ports;

// Dataset model, rule primitives, run lifecycle and scoring.
// Depends on nothing else in the crate.
pub mod domain;

// Adapters: CSV ingestion, YAML config, run stores, HTML renderer.
pub mod infrastructure;

// Use cases: rule runner, reports, run orchestration, demo, clean.
pub mod application;

pub mod error;

// --- RE-EXPORTS ---
// use sentinel_core::SentinelError;
pub use error::SentinelError;
