//! Periodic polling driver
//!
//! One task owns the reconciler and ticks every counter on a fixed
//! interval. Tick outcomes are logged here; the reconciler itself stays
//! silent so its tests assert on values, not log output.

use std::time::Duration;

use log::{debug, warn};
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use crate::domain::TickError;
use crate::metrics::MetricSink;

use super::reconciler::{Reconciler, TickOutcome};

/// How often every monitored counter is reconciled
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Tick the reconciler on `interval` until the shutdown channel flips.
///
/// Ticks never overlap: this task is the only driver, and a tick is a
/// handful of map reads, far below the interval. Per-tick errors are
/// logged and contained; every counter stays scheduled.
pub async fn run_poll_loop<S: MetricSink>(
    mut reconciler: Reconciler<S>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for tick in reconciler.tick_all() {
                    report_tick(tick.name, &tick.result);
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    debug!("poll loop stopped");
}

fn report_tick(name: &str, result: &Result<TickOutcome, TickError>) {
    match result {
        Ok(TickOutcome::Forwarded { delta, active_lanes }) => {
            debug!("{name}: forwarded {delta} events (from {active_lanes} CPUs)");
        }
        Ok(TickOutcome::Idle) => {}
        Ok(TickOutcome::Reanchored { previous, current }) => {
            warn!("{name}: kernel total went backwards ({previous} to {current}), re-anchored baseline");
        }
        Err(e) => warn!("tick failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::reconciler::MonitoredCounter;
    use super::super::test_support::{RecordingSink, SteadySource};
    use super::*;

    #[tokio::test]
    async fn test_poll_loop_ticks_until_shutdown() {
        let sink = Arc::new(RecordingSink::default());
        let mut reconciler = Reconciler::new(Arc::clone(&sink));
        reconciler.add_counter(MonitoredCounter::new(
            "execs",
            2,
            Box::new(SteadySource::new(vec![3, 4])),
        ));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run_poll_loop(reconciler, Duration::from_millis(1), shutdown_rx));

        // Give the loop a few ticks, then stop it
        time::sleep(Duration::from_millis(20)).await;
        shutdown_tx.send(true).expect("receiver alive");

        time::timeout(Duration::from_secs(1), task)
            .await
            .expect("loop should stop promptly")
            .expect("loop task should not panic");

        // Steady lanes forward once, then every later tick is idle
        assert_eq!(sink.calls(), vec![("execs".to_string(), 7)]);
    }

    #[tokio::test]
    async fn test_poll_loop_stops_when_sender_drops() {
        let sink = Arc::new(RecordingSink::default());
        let reconciler = Reconciler::new(Arc::clone(&sink));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run_poll_loop(reconciler, Duration::from_millis(1), shutdown_rx));

        drop(shutdown_tx);
        time::timeout(Duration::from_secs(1), task)
            .await
            .expect("loop should treat a dropped sender as shutdown")
            .expect("loop task should not panic");
    }
}
