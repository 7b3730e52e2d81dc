//! # eBPF Kernel-Side Instrumentation
//!
//! eBPF program that runs inside the Linux kernel to count exec activity.
//!
//! ## Programs
//!
//! - **Tracepoint**: `observe_execve` - Fires on every `sys_enter_execve`
//!
//! ## Maps (Shared with Userspace)
//!
//! Single-entry per-CPU arrays; each CPU bumps its own lane and userspace
//! sums the lanes on every poll:
//!
//! - `EXEC_EVENTS` - All execve invocations
//! - `SUDO_EVENTS` - Invocations of a binary named `sudo`
//! - `PASSWD_READ_EVENTS` - `cat /etc/passwd` and `sudo cat /etc/passwd`
//!
//! ## Build
//!
//! Always compiled in release mode (debug includes incompatible formatting code):
//! ```bash
//! cargo xtask build-ebpf --release
//! ```

#![no_std]
#![no_main]
#![allow(unused_unsafe)]

use aya_ebpf::{
    helpers::{bpf_probe_read_user, bpf_probe_read_user_str_bytes},
    macros::{map, tracepoint},
    maps::PerCpuArray,
    programs::TracePointContext,
    EbpfContext,
};
use execwatch_common::{ExecveEnterArgs, ARG_CAPACITY, FILENAME_CAPACITY};

// ============================================================================
// eBPF Maps - Striped counters, one lane per possible CPU
// ============================================================================

/// Count of all `execve` invocations
///
/// Bumped unconditionally at tracepoint entry, before any argument read
/// can fail. Userspace sums all lanes to recover the host-wide total.
#[map]
static EXEC_EVENTS: PerCpuArray<u64> = PerCpuArray::with_max_entries(1, 0);

/// Count of `execve` invocations of a binary whose path ends in `/sudo`
#[map]
static SUDO_EVENTS: PerCpuArray<u64> = PerCpuArray::with_max_entries(1, 0);

/// Count of `/etc/passwd` read attempts
///
/// Both the direct form (`cat /etc/passwd`) and the escalated form
/// (`sudo cat /etc/passwd`) land here.
#[map]
static PASSWD_READ_EVENTS: PerCpuArray<u64> = PerCpuArray::with_max_entries(1, 0);

// ============================================================================
// eBPF Program Hooks
// ============================================================================

/// Hook: `syscalls/sys_enter_execve` tracepoint
/// Fires once per execve attempt, successful or not
#[tracepoint]
pub fn observe_execve(ctx: TracePointContext) -> u32 {
    match try_observe_execve(&ctx) {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

fn try_observe_execve(ctx: &TracePointContext) -> Result<(), i64> {
    // Every exec counts, even when the argument reads below fail
    bump(&EXEC_EVENTS);

    // Read tracepoint arguments
    // Layout from /sys/kernel/debug/tracing/events/syscalls/sys_enter_execve/format
    let args: *const ExecveEnterArgs = ctx.as_ptr() as *const ExecveEnterArgs;
    let filename_ptr = unsafe { (*args).filename };
    let argv = unsafe { (*args).argv };

    let mut filename = [0u8; FILENAME_CAPACITY];
    let path = match unsafe { bpf_probe_read_user_str_bytes(filename_ptr, &mut filename) } {
        Ok(path) if !path.is_empty() => path,
        // Unreadable or empty path: the exec was counted, detection ends here
        _ => return Ok(()),
    };

    let is_sudo = ends_with_component(path, b"sudo");
    let is_cat = ends_with_component(path, b"cat");

    if is_sudo {
        bump(&SUDO_EVENTS);
    }

    // "cat /etc/passwd" directly, or "sudo cat /etc/passwd" one level down
    if is_cat && arg_equals(argv, 1, b"/etc/passwd")? {
        bump(&PASSWD_READ_EVENTS);
    } else if is_sudo && arg_equals(argv, 1, b"cat")? && arg_equals(argv, 2, b"/etc/passwd")? {
        bump(&PASSWD_READ_EVENTS);
    }

    Ok(())
}

/// Increment this CPU's lane of a striped counter
///
/// Plain add: a tracepoint handler cannot migrate CPUs mid-execution, so the
/// lane is exclusively ours for the duration.
fn bump(counter: &PerCpuArray<u64>) {
    if let Some(slot) = counter.get_ptr_mut(0) {
        unsafe { *slot += 1 };
    }
}

/// Check that the final path component equals `name` (e.g. "/usr/bin/sudo"
/// ends with component "sudo"). A bare command with no slash never matches.
fn ends_with_component(path: &[u8], name: &[u8]) -> bool {
    if path.len() < name.len() + 1 {
        return false;
    }
    let slash = path.len() - name.len() - 1;
    if path.get(slash) != Some(&b'/') {
        return false;
    }
    let mut i = 0;
    while i < name.len() {
        if path.get(slash + 1 + i) != Some(&name[i]) {
            return false;
        }
        i += 1;
    }
    true
}

/// Compare `argv[index]` (a userspace string) against `expected`
///
/// A missing vector entry or an unreadable string is a non-match; a failed
/// read of the pointer slot itself aborts detection for this event.
fn arg_equals(argv: *const *const u8, index: usize, expected: &[u8]) -> Result<bool, i64> {
    let ptr = unsafe { bpf_probe_read_user(argv.wrapping_add(index))? };
    if ptr.is_null() {
        return Ok(false);
    }

    let mut buf = [0u8; ARG_CAPACITY];
    match unsafe { bpf_probe_read_user_str_bytes(ptr, &mut buf) } {
        Ok(arg) => Ok(arg == expected),
        Err(_) => Ok(false),
    }
}

#[cfg(all(not(test), target_os = "none"))]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    unsafe { core::hint::unreachable_unchecked() }
}
