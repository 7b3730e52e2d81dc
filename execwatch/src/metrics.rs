//! Metric sink
//!
//! The [`MetricSink`] trait is the seam between reconciliation and
//! publication: the poller only ever asks for a named counter to grow.
//! The production sink is a Prometheus registry with one `IntCounter` per
//! event class, registered once at startup. `IntCounter` can only
//! increase, so published values are monotone by construction, and both
//! the registry and the counters are safe to share between the polling
//! task and the scrape handler.

use std::collections::HashMap;

use anyhow::{Context, Result};
use log::warn;
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

use crate::domain::EventClass;

/// Destination for reconciled event deltas
pub trait MetricSink {
    /// Add `amount` to the counter registered under `name`
    fn increment_counter(&self, name: &str, amount: u64);
}

/// Prometheus-backed sink with one counter per event class
#[derive(Clone)]
pub struct PrometheusSink {
    registry: Registry,
    counters: HashMap<&'static str, IntCounter>,
}

impl PrometheusSink {
    /// Build a fresh registry and register one counter per event class.
    ///
    /// # Errors
    /// Returns an error if a counter cannot be created or registered;
    /// startup should abort in that case.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let mut counters = HashMap::new();

        for class in EventClass::ALL {
            let counter = IntCounter::new(class.metric_name(), class.help())
                .with_context(|| format!("Failed to create counter {}", class.metric_name()))?;
            registry
                .register(Box::new(counter.clone()))
                .with_context(|| format!("Failed to register counter {}", class.metric_name()))?;
            counters.insert(class.metric_name(), counter);
        }

        Ok(Self { registry, counters })
    }

    /// Render the text exposition for a scrape.
    ///
    /// # Errors
    /// Returns an error if encoding fails, which the scrape handler treats
    /// as an empty exposition rather than an HTTP error.
    pub fn render(&self) -> Result<String> {
        let mut body = String::new();
        let encoder = TextEncoder::new();
        encoder
            .encode_utf8(&self.registry.gather(), &mut body)
            .context("Failed to encode metrics exposition")?;
        Ok(body)
    }

    /// Content type of the exposition format served by [`Self::render`]
    #[must_use]
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }
}

impl MetricSink for PrometheusSink {
    fn increment_counter(&self, name: &str, amount: u64) {
        if let Some(counter) = self.counters.get(name) {
            counter.inc_by(amount);
        } else {
            // Counters are registered up front; an unknown name is a wiring bug
            warn!("dropping increment for unregistered metric {name}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_counters_appear_in_the_exposition() {
        let sink = PrometheusSink::new().expect("registry setup");
        sink.increment_counter("ebpf_exec_events_total", 5);

        let body = sink.render().expect("render");
        assert!(body.contains("# HELP ebpf_exec_events_total Total execve events recorded by eBPF"));
        assert!(body.contains("# TYPE ebpf_exec_events_total counter"));
        assert!(body.contains("ebpf_exec_events_total 5"));
        // Untouched counters still render, at zero
        assert!(body.contains("ebpf_sudo_events_total 0"));
        assert!(body.contains("ebpf_passwd_read_events_total 0"));
    }

    #[test]
    fn test_increments_accumulate() {
        let sink = PrometheusSink::new().expect("registry setup");
        sink.increment_counter("ebpf_sudo_events_total", 3);
        sink.increment_counter("ebpf_sudo_events_total", 4);

        let body = sink.render().expect("render");
        assert!(body.contains("ebpf_sudo_events_total 7"));
    }

    #[test]
    fn test_unknown_metric_is_dropped() {
        let sink = PrometheusSink::new().expect("registry setup");
        sink.increment_counter("not_a_registered_metric", 9);

        let body = sink.render().expect("render");
        assert!(!body.contains("not_a_registered_metric"));
        assert!(body.contains("ebpf_exec_events_total 0"));
    }

    #[test]
    fn test_clones_share_the_same_counters() {
        let sink = PrometheusSink::new().expect("registry setup");
        let clone = sink.clone();

        let threads: Vec<_> = (0..4)
            .map(|_| {
                let sink = sink.clone();
                std::thread::spawn(move || {
                    for _ in 0..250 {
                        sink.increment_counter("ebpf_exec_events_total", 1);
                    }
                })
            })
            .collect();
        for handle in threads {
            handle.join().expect("incrementer thread");
        }

        let body = clone.render().expect("render");
        assert!(body.contains("ebpf_exec_events_total 1000"));
    }

    #[test]
    fn test_content_type_is_text_exposition() {
        let sink = PrometheusSink::new().expect("registry setup");
        assert!(sink.content_type().starts_with("text/plain"));
    }
}
