//! # execwatch - eBPF Exec Activity Exporter
//!
//! execwatch attaches a tracepoint program to `syscalls/sys_enter_execve`,
//! lets the kernel side maintain striped (per-CPU) event counters, and
//! republishes those counters as monotonically increasing Prometheus
//! counters over an HTTP scrape endpoint.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                      Linux Kernel                      │
//! │   tracepoint: syscalls/sys_enter_execve                │
//! │   per-CPU maps: EXEC_EVENTS, SUDO_EVENTS,              │
//! │                 PASSWD_READ_EVENTS (one lane per CPU)  │
//! └──────────────────────┬─────────────────────────────────┘
//!                        │ map reads (1 s poll)
//!                        ▼
//! ┌────────────────────────────────────────────────────────┐
//! │                 execwatch (this crate)                 │
//! │                                                        │
//! │  ┌───────────┐    ┌────────────┐    ┌─────────────┐   │
//! │  │  Counter  │──▶│ Reconciler │──▶│ Prometheus  │   │
//! │  │  Sources  │    │  (deltas)  │    │    Sink     │   │
//! │  └───────────┘    └────────────┘    └──────┬──────┘   │
//! │                                            │          │
//! │                                     GET /metrics      │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`tracer`]: Load the embedded eBPF object and attach the tracepoint
//! - [`polling`]: Counter sources, delta reconciliation, and the periodic driver
//! - [`metrics`]: Prometheus registry behind the [`metrics::MetricSink`] seam
//! - [`server`]: axum scrape endpoint with graceful shutdown
//! - [`domain`]: Event classes and structured error types
//! - [`cpu`]: Possible-CPU discovery (striped counters have one lane per CPU)
//! - [`preflight`]: Privilege and kernel version checks
//! - [`cli`]: Command-line argument parsing
//!
//! ## Reconciliation Model
//!
//! The kernel only ever increments its lanes, so the lane sum is a cumulative
//! total. Each tick forwards the increase since the previous tick to the
//! sink; a total that moved backward (program reloaded) re-anchors the
//! baseline without emitting. Published counters therefore never decrease
//! and never double count.
//!
//! ## Typical Usage
//!
//! ```bash
//! # Build the kernel-side program, then run the agent
//! cargo xtask build-ebpf --release
//! sudo ./target/release/execwatch
//!
//! # Scrape
//! curl http://localhost:9110/metrics
//! ```

// Expose modules for testing
pub mod cli;
pub mod cpu;
pub mod domain;
pub mod metrics;
pub mod polling;
pub mod preflight;
pub mod server;
pub mod tracer;
