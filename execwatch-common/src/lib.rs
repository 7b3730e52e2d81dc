//! # Shared Constants (eBPF ↔ Userspace)
//!
//! Defines the tracepoint ABI layout and buffer capacities shared between the
//! kernel-side eBPF program and userspace. All types use `#[repr(C)]` for
//! consistent memory layout across the kernel/userspace boundary.
//!
//! The kernel side keeps its counters in single-entry per-CPU array maps, so
//! no event structs cross the boundary here; only the `sys_enter_execve`
//! record layout and the string-read capacities do.

#![no_std]

// ============================================================================
// Read Capacities
// ============================================================================

/// Maximum bytes read from the `filename` argument of `execve`.
///
/// Paths longer than this are truncated before suffix matching. 128 bytes
/// comfortably covers the binaries of interest (`/usr/bin/sudo` etc.) while
/// keeping eBPF stack usage within the 512-byte verifier limit.
pub const FILENAME_CAPACITY: usize = 128;

/// Maximum bytes read from a single `argv` entry.
///
/// Only short arguments are ever compared (`cat`, `/etc/passwd`), so 16 bytes
/// suffices: a longer argument cannot equal either pattern.
pub const ARG_CAPACITY: usize = 16;

// ============================================================================
// Tracepoint ABI
// ============================================================================

/// Tracepoint arguments for `syscalls/sys_enter_execve`
///
/// Layout defined by the Linux kernel tracepoint ABI:
/// `/sys/kernel/debug/tracing/events/syscalls/sys_enter_execve/format`
///
/// Field offsets: common header occupies bytes 0..8, `__syscall_nr` sits at
/// offset 8, and the three syscall arguments start 8-byte aligned at offset
/// 16 (`filename`), 24 (`argv`), and 32 (`envp`). The pointers are userspace
/// addresses; their targets must be read with `bpf_probe_read_user*`.
#[repr(C)]
pub struct ExecveEnterArgs {
    /// Unused padding (kernel tracepoint common fields)
    #[allow(clippy::pub_underscore_fields)]
    pub __unused__: u64,

    /// Syscall number (`__NR_execve`)
    pub syscall_nr: i32,

    /// Userspace pointer to the NUL-terminated path being executed
    pub filename: *const u8,

    /// Userspace pointer to the NULL-terminated argument vector
    pub argv: *const *const u8,

    /// Userspace pointer to the NULL-terminated environment vector
    pub envp: *const *const u8,
}
