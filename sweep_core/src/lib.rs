#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Per-object sensor-activation ledger (hardware-agnostic).
//!
//! This crate turns raw photo-sensor sweep events and IMU samples into a
//! trustworthy, queryable snapshot per tracked object. The acquisition layer
//! pushes events in; a downstream pose solver reads angles, timecodes and
//! freshness summaries back out.
//!
//! ## Architecture
//!
//! - **Timecodes**: 32-bit hardware counters reconstructed to monotonically
//!   comparable 64-bit values per clock domain (`timecode` module)
//! - **Baseline**: per lighthouse/axis exponentially-weighted mean/deviation
//!   (`stats` module)
//! - **Outlier filter**: rate-of-change and Chauvenet-style likelihood gates
//!   in front of the optical store
//! - **Ledger**: optical activation records, inertial fusion, movement and
//!   runtime-clock bookkeeping, coverage queries (`ledger` module)
//!
//! Everything is single-threaded and non-blocking: one producer feeds a
//! given object's ledger, readers consult it between ingest calls, and
//! distinct objects are fully independent.

// Module declarations
pub mod config;
pub mod error;
pub mod ledger;
pub mod mocks;
pub mod stats;
pub mod timecode;
pub mod util;

pub use config::Thresholds;
pub use error::LedgerError;
pub use ledger::{
    Activations, Axis, CoverageSummary, Generation, ImuSample, LightGen1, LightGen2, OpticalSlot,
    AXES, GEN1_LIGHTHOUSES, MAX_LIGHTHOUSES, MAX_SENSORS,
};
pub use timecode::extend_timecode;

/// Hardware clock rate for every timecode in this crate, in ticks per second.
pub const TICK_FREQUENCY: u64 = 48_000_000;

/// Default freshness window: one nominal 16.7 ms frame plus a small margin.
pub const DEFAULT_TOLERANCE: u64 = (TICK_FREQUENCY as f64 * 16.7 / 1000.0) as u64 + 5000;

#[cfg(test)]
mod tolerance_tests {
    use super::DEFAULT_TOLERANCE;

    #[test]
    fn default_tolerance_is_bit_exact() {
        assert_eq!(DEFAULT_TOLERANCE, 806_600);
    }
}
