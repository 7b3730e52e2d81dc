//! Monotone reconciliation of striped kernel counters.
//!
//! The kernel side only ever increments its lanes, so a lane sum is a
//! cumulative total. Each tick reads one counter, sums its lanes without
//! wrapping, and forwards the increase since the previous successful tick
//! to the metric sink. A total below the stored baseline means the kernel
//! state was reset (program reloaded); the baseline re-anchors at the new
//! total and nothing is emitted, keeping published counters monotone.
//!
//! Per counter per tick there is at most one sink call and at most one
//! state mutation, and every error leaves the state untouched.

use crate::domain::TickError;
use crate::metrics::MetricSink;

use super::source::CounterSource;

/// One kernel counter under reconciliation
///
/// Lives for the process lifetime; `last_cumulative_total` starts at zero so
/// the first successful tick forwards everything counted between attachment
/// and that tick.
pub struct MonitoredCounter {
    name: &'static str,
    lane_count: usize,
    last_cumulative_total: u64,
    source: Box<dyn CounterSource + Send>,
}

impl MonitoredCounter {
    #[must_use]
    pub fn new(
        name: &'static str,
        lane_count: usize,
        source: Box<dyn CounterSource + Send>,
    ) -> Self {
        Self { name, lane_count, last_cumulative_total: 0, source }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn lane_count(&self) -> usize {
        self.lane_count
    }

    /// Cumulative kernel total as of the last successful tick
    #[must_use]
    pub fn last_cumulative_total(&self) -> u64 {
        self.last_cumulative_total
    }
}

/// What a single counter's tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// New events were forwarded to the sink
    Forwarded { delta: u64, active_lanes: usize },
    /// No change since the previous tick; the sink was not called
    Idle,
    /// Kernel total moved backward; baseline re-anchored, nothing emitted
    Reanchored { previous: u64, current: u64 },
}

/// Outcome of one counter within a [`Reconciler::tick_all`] pass
pub struct CounterTick {
    pub name: &'static str,
    pub result: Result<TickOutcome, TickError>,
}

/// Owns the monitored counters and drives their reconciliation
pub struct Reconciler<S> {
    counters: Vec<MonitoredCounter>,
    sink: S,
}

impl<S: MetricSink> Reconciler<S> {
    #[must_use]
    pub fn new(sink: S) -> Self {
        Self { counters: Vec::new(), sink }
    }

    pub fn add_counter(&mut self, counter: MonitoredCounter) {
        self.counters.push(counter);
    }

    #[must_use]
    pub fn counters(&self) -> &[MonitoredCounter] {
        &self.counters
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Tick every counter once, in registration order.
    ///
    /// Counters are independent: one counter's failure never prevents the
    /// rest from ticking.
    pub fn tick_all(&mut self) -> Vec<CounterTick> {
        self.counters
            .iter_mut()
            .map(|counter| CounterTick {
                name: counter.name,
                result: Self::tick_one(counter, &self.sink),
            })
            .collect()
    }

    fn tick_one(counter: &mut MonitoredCounter, sink: &S) -> Result<TickOutcome, TickError> {
        let lanes = counter.source.snapshot().map_err(|source| TickError::ReadFailure {
            name: counter.name.to_string(),
            source,
        })?;

        if lanes.len() != counter.lane_count {
            return Err(TickError::LaneCountMismatch {
                name: counter.name.to_string(),
                expected: counter.lane_count,
                actual: lanes.len(),
            });
        }

        let total = lanes
            .iter()
            .try_fold(0u64, |acc, &lane| acc.checked_add(lane))
            .ok_or_else(|| TickError::SumOverflow { name: counter.name.to_string() })?;

        if total < counter.last_cumulative_total {
            let previous = counter.last_cumulative_total;
            counter.last_cumulative_total = total;
            return Ok(TickOutcome::Reanchored { previous, current: total });
        }

        let delta = total - counter.last_cumulative_total;
        if delta == 0 {
            return Ok(TickOutcome::Idle);
        }

        let active_lanes = lanes.iter().filter(|&&lane| lane > 0).count();
        sink.increment_counter(counter.name, delta);
        counter.last_cumulative_total = total;
        Ok(TickOutcome::Forwarded { delta, active_lanes })
    }
}
