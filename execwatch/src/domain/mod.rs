//! Domain model for execwatch
//!
//! Event classes bind kernel maps to published metrics; the error types
//! give every reconciliation failure a structured shape instead of a log
//! line.

pub mod errors;
pub mod event_class;

// Re-export common types for convenience
pub use errors::{SnapshotError, TickError};
pub use event_class::EventClass;
