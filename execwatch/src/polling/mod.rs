//! Counter polling pipeline
//!
//! This module contains the reconciliation core extracted from main.rs:
//! - Counter sources (where striped lane values come from)
//! - Delta reconciliation against the last published total
//! - The periodic driver task

pub mod driver;
pub mod reconciler;
pub mod source;

// Re-export common types
pub use driver::{run_poll_loop, POLL_INTERVAL};
pub use reconciler::{CounterTick, MonitoredCounter, Reconciler, TickOutcome};
pub use source::{CounterSource, PerCpuArraySource};

#[cfg(test)]
pub(crate) mod test_support {
    //! In-memory fakes shared by the polling tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use crate::domain::SnapshotError;
    use crate::metrics::MetricSink;

    use super::source::CounterSource;

    /// Source that replays a fixed script of snapshots, one per tick
    pub struct ScriptedSource {
        snapshots: VecDeque<Result<Vec<u64>, SnapshotError>>,
    }

    impl ScriptedSource {
        pub fn new(snapshots: Vec<Result<Vec<u64>, SnapshotError>>) -> Self {
            Self { snapshots: snapshots.into() }
        }

        pub fn of_lanes(snapshots: Vec<Vec<u64>>) -> Self {
            Self::new(snapshots.into_iter().map(Ok).collect())
        }

        pub fn read_failure() -> Result<Vec<u64>, SnapshotError> {
            Err(SnapshotError::ReadFailure("scripted failure".to_string()))
        }
    }

    impl CounterSource for ScriptedSource {
        fn snapshot(&mut self) -> Result<Vec<u64>, SnapshotError> {
            self.snapshots.pop_front().expect("scripted source exhausted")
        }
    }

    /// Source that returns the same lanes forever
    pub struct SteadySource {
        lanes: Vec<u64>,
    }

    impl SteadySource {
        pub fn new(lanes: Vec<u64>) -> Self {
            Self { lanes }
        }
    }

    impl CounterSource for SteadySource {
        fn snapshot(&mut self) -> Result<Vec<u64>, SnapshotError> {
            Ok(self.lanes.clone())
        }
    }

    /// Sink that records every forwarded increment
    #[derive(Default)]
    pub struct RecordingSink {
        calls: Mutex<Vec<(String, u64)>>,
    }

    impl RecordingSink {
        pub fn calls(&self) -> Vec<(String, u64)> {
            self.calls.lock().expect("sink lock poisoned").clone()
        }

        pub fn total_for(&self, name: &str) -> u64 {
            self.calls().iter().filter(|(n, _)| n == name).map(|(_, amount)| amount).sum()
        }
    }

    impl MetricSink for RecordingSink {
        fn increment_counter(&self, name: &str, amount: u64) {
            self.calls.lock().expect("sink lock poisoned").push((name.to_string(), amount));
        }
    }

    // Lets a test keep a handle on the sink while the reconciler owns a clone
    impl MetricSink for std::sync::Arc<RecordingSink> {
        fn increment_counter(&self, name: &str, amount: u64) {
            self.as_ref().increment_counter(name, amount);
        }
    }
}
