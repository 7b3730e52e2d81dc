//! # execwatch - Main Entry Point
//!
//! Startup is fail-fast: a failed preflight check or eBPF attachment aborts
//! the process with a nonzero exit code. Once running, two tasks carry the
//! work until Ctrl-C: a periodic poller that reconciles kernel counters into
//! Prometheus counters, and an HTTP server exposing them on `/metrics`.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use tokio::net::TcpListener;
use tokio::sync::watch;

use execwatch::cli::Args;
use execwatch::cpu::possible_cpu_count;
use execwatch::domain::EventClass;
use execwatch::metrics::PrometheusSink;
use execwatch::polling::{run_poll_loop, MonitoredCounter, Reconciler, POLL_INTERVAL};
use execwatch::preflight::run_preflight_checks;
use execwatch::server;
use execwatch::tracer::Tracer;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_NOPERM: i32 = 77;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    let msg = err.to_string().to_lowercase();
    if msg.contains("permission denied") || msg.contains("requires root") {
        EXIT_NOPERM
    } else {
        EXIT_ERROR
    }
}

#[tokio::main]
async fn run() -> Result<()> {
    let args = Args::parse();
    let quiet = args.quiet;

    // Run pre-flight checks before anything else
    run_preflight_checks()?;

    // Striped counters carry one lane per possible CPU, fixed for the
    // process lifetime
    let lane_count = possible_cpu_count()?;

    if !quiet {
        println!("execwatch v{}", env!("CARGO_PKG_VERSION"));
        println!("lanes: {lane_count} possible CPUs");
        println!("listen: {}", args.listen);
    }

    // ── Phase 1: Load eBPF and attach the execve tracepoint ─────────────
    // Any failure here is fatal: without the kernel program there is
    // nothing to poll.
    let mut tracer = Tracer::attach()?;

    // ── Phase 2: Metric sink and reconciler ─────────────────────────────
    let sink = PrometheusSink::new()?;
    let mut reconciler = Reconciler::new(sink.clone());
    for class in EventClass::ALL {
        let source = tracer.take_counter_source(class)?;
        reconciler.add_counter(MonitoredCounter::new(
            class.metric_name(),
            lane_count,
            Box::new(source),
        ));
    }

    // ── Phase 3: Scrape endpoint and poll loop ──────────────────────────
    let listener = TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("Failed to bind {}", args.listen))?;
    info!("✓ Serving metrics on http://{}/metrics", listener.local_addr()?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut server_task = tokio::spawn(server::serve(listener, sink, shutdown_rx.clone()));
    let poll_task = tokio::spawn(run_poll_loop(reconciler, POLL_INTERVAL, shutdown_rx));

    // ── Phase 4: Run until Ctrl-C, then drain ───────────────────────────
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    tokio::select! {
        _ = &mut ctrl_c => {
            info!("Ctrl-C received, shutting down");
        }
        joined = &mut server_task => {
            joined.context("metrics server task failed")??;
            anyhow::bail!("metrics server exited unexpectedly");
        }
    }

    shutdown_tx.send(true).ok();
    poll_task.await.context("poll loop task failed")?;
    server_task.await.context("metrics server task failed")??;

    // Dropping the tracer detaches the tracepoint and releases the maps
    drop(tracer);

    Ok(())
}
