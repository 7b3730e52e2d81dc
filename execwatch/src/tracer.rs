//! # eBPF Program Loading and Attachment
//!
//! Loads the compiled eBPF bytecode, attaches the execve tracepoint, and
//! hands out the striped counter maps as polling sources. Attachment
//! failures are startup-fatal by design: without the kernel program there
//! is nothing to poll, so the caller exits nonzero instead of serving
//! counters that can never move.

use anyhow::{Context, Result};
use aya::{include_bytes_aligned, maps::PerCpuArray, programs::TracePoint, Ebpf};
use log::info;

use crate::domain::EventClass;
use crate::polling::PerCpuArraySource;

/// Owns the loaded eBPF object for the process lifetime
///
/// Dropping the tracer detaches the tracepoint and releases the maps; the
/// kernel then frees the counters once the last map handle is gone.
pub struct Tracer {
    bpf: Ebpf,
}

impl Tracer {
    /// Load the embedded eBPF object and attach `syscalls/sys_enter_execve`.
    ///
    /// Always uses the release build of the kernel program because debug
    /// builds with recent Rust nightlies pull in formatting code that is
    /// incompatible with the BPF linker.
    ///
    /// # Errors
    /// Returns an error if loading, verification, or attachment fails.
    pub fn attach() -> Result<Self> {
        let mut bpf = load_ebpf_object()?;

        let program: &mut TracePoint = bpf
            .program_mut("observe_execve")
            .context("observe_execve program not found in eBPF object")?
            .try_into()?;
        program.load()?;
        program.attach("syscalls", "sys_enter_execve")?;
        info!("✓ Attached tracepoint: syscalls/sys_enter_execve");

        Ok(Self { bpf })
    }

    /// Take ownership of the striped counter behind one event class.
    ///
    /// Each class's map can be taken once; the source keeps the map handle
    /// for the rest of the process lifetime.
    ///
    /// # Errors
    /// Returns an error if the map is missing from the object or has an
    /// unexpected type.
    pub fn take_counter_source(&mut self, class: EventClass) -> Result<PerCpuArraySource> {
        let map = self
            .bpf
            .take_map(class.map_name())
            .with_context(|| format!("{} map not found in eBPF object", class.map_name()))?;
        let array: PerCpuArray<_, u64> = PerCpuArray::try_from(map)
            .with_context(|| format!("{} is not a per-CPU array of u64", class.map_name()))?;
        Ok(PerCpuArraySource::new(class.map_name(), array))
    }
}

fn load_ebpf_object() -> Result<Ebpf> {
    let bpf = Ebpf::load(include_bytes_aligned!(
        "../../target/bpfel-unknown-none/release/execwatch"
    ))?;
    Ok(bpf)
}
