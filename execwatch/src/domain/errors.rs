//! Structured error types for execwatch
//!
//! Using thiserror for automatic Display implementation and error chaining.

use thiserror::Error;

/// Failure reading a striped counter from its kernel map
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The per-CPU map lookup failed in the kernel
    #[error("map read failed: {0}")]
    ReadFailure(String),
}

/// Failure of a single counter's reconciliation tick
///
/// Every variant leaves the counter's stored total untouched; the next tick
/// starts from the same baseline.
#[derive(Error, Debug)]
pub enum TickError {
    #[error("counter {name}: {source}")]
    ReadFailure { name: String, source: SnapshotError },

    #[error("counter {name}: expected {expected} lanes, snapshot has {actual}")]
    LaneCountMismatch { name: String, expected: usize, actual: usize },

    #[error("counter {name}: lane sum overflows u64")]
    SumOverflow { name: String },
}
