//! Counter sources
//!
//! A [`CounterSource`] is one striped counter as the poller sees it: an
//! ordered set of lanes, one per possible CPU, each holding a cumulative
//! event count. The production source reads a single-entry per-CPU array
//! owned by the loaded eBPF object; tests script lane values in memory.

use aya::maps::{MapData, PerCpuArray};

use crate::domain::SnapshotError;

/// One striped counter's read side
pub trait CounterSource {
    /// Read every lane of the counter, in lane order.
    ///
    /// A snapshot is observational only: the caller decides what to do with
    /// the values, and a failed read must leave the source usable for the
    /// next tick.
    ///
    /// # Errors
    /// Returns [`SnapshotError::ReadFailure`] when the underlying read fails.
    fn snapshot(&mut self) -> Result<Vec<u64>, SnapshotError>;
}

/// Production source backed by a kernel per-CPU array map
///
/// The map has a single entry at index 0; the kernel returns one value per
/// possible CPU, which is exactly the lane layout the reconciler expects.
pub struct PerCpuArraySource {
    map_name: &'static str,
    map: PerCpuArray<MapData, u64>,
}

impl PerCpuArraySource {
    #[must_use]
    pub fn new(map_name: &'static str, map: PerCpuArray<MapData, u64>) -> Self {
        Self { map_name, map }
    }

    #[must_use]
    pub fn map_name(&self) -> &'static str {
        self.map_name
    }
}

impl CounterSource for PerCpuArraySource {
    fn snapshot(&mut self) -> Result<Vec<u64>, SnapshotError> {
        let values = self
            .map
            .get(&0, 0)
            .map_err(|e| SnapshotError::ReadFailure(format!("{}: {e}", self.map_name)))?;
        Ok(values.to_vec())
    }
}
