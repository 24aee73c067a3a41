use thiserror::Error;

use crate::ledger::Generation;

/// Errors surfaced by ledger ingest.
///
/// Rejected samples and out-of-range indices are not errors; those report as
/// `Ok(false)` and leave the stored state untouched.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LedgerError {
    /// The ledger was pinned to one protocol generation and an event from
    /// the other arrived.
    #[error("ingest generation mismatch: ledger pinned to {pinned:?}, event is {event:?}")]
    GenerationMismatch { pinned: Generation, event: Generation },
    /// Too many timing anomalies; the upstream clock source cannot be
    /// trusted and derived pose data would be invalid.
    #[error("clock source unstable after {anomalies} timing anomalies")]
    ClockUnstable { anomalies: u32 },
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
