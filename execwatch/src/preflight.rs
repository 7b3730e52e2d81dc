//! Pre-flight checks for execwatch
//!
//! Validates system requirements before attempting to load eBPF programs.
//! Provides clear, actionable error messages when requirements aren't met.

#![allow(unsafe_code)] // geteuid() requires unsafe

use anyhow::{bail, Context, Result};

/// Minimum kernel version required for the eBPF features used by execwatch
const MIN_KERNEL_VERSION: (u32, u32) = (5, 8);

/// Run all pre-flight checks before eBPF loading
///
/// # Errors
/// Returns an error when a requirement is not met; the message says how to
/// fix it.
pub fn run_preflight_checks() -> Result<()> {
    check_privileges()?;
    check_kernel_version()?;
    Ok(())
}

/// Check if running with sufficient privileges for eBPF
fn check_privileges() -> Result<()> {
    // Check if running as root
    if unsafe { libc::geteuid() } == 0 {
        return Ok(());
    }

    // Not root - check for CAP_BPF and CAP_PERFMON (Linux 5.8+)
    // For simplicity, we'll just require root for now since capability
    // checking requires additional dependencies
    bail!(
        "Permission denied: execwatch requires root privileges to load eBPF programs.\n\n\
         Run with: sudo execwatch ..."
    );
}

/// Check if the kernel version is sufficient for eBPF features
fn check_kernel_version() -> Result<()> {
    let version_str = std::fs::read_to_string("/proc/version")
        .context("Failed to read kernel version from /proc/version")?;

    // Parse version like "Linux version 5.15.0-generic ..." or "Linux version 6.1.0-arch1-1 ..."
    let release = version_str.split_whitespace().nth(2).unwrap_or("unknown");

    let Some((major, minor)) = parse_kernel_release(release) else {
        // Can't parse, assume it's fine
        return Ok(());
    };

    if (major, minor) < MIN_KERNEL_VERSION {
        bail!(
            "Kernel version {}.{} is too old.\n\n\
             execwatch requires Linux {}.{} or newer to load its tracepoint program.\n\
             Current kernel: {}",
            major,
            minor,
            MIN_KERNEL_VERSION.0,
            MIN_KERNEL_VERSION.1,
            release
        );
    }

    Ok(())
}

/// Extract (major, minor) from a kernel release string like "6.1.0-arch1-1"
fn parse_kernel_release(release: &str) -> Option<(u32, u32)> {
    let mut parts = release.split('.');
    let major: u32 = parts.next()?.parse().ok()?;
    let minor: u32 = parts
        .next()?
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .ok()?;
    Some((major, minor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kernel_release() {
        assert_eq!(parse_kernel_release("5.15.0-generic"), Some((5, 15)));
        assert_eq!(parse_kernel_release("6.1.0-arch1-1"), Some((6, 1)));
        assert_eq!(parse_kernel_release("6.18.5-fc-v20"), Some((6, 18)));
        assert_eq!(parse_kernel_release("unknown"), None);
    }

    #[test]
    fn test_kernel_version_check() {
        // This should pass on any modern system
        let result = check_kernel_version();
        // Don't assert success since test might run on old kernel
        // Just ensure it doesn't panic
        let _ = result;
    }
}
