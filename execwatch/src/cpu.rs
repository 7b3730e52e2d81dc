//! CPU topology helpers
//!
//! Per-CPU array maps allocate one slot per possible CPU, so lane counts
//! come from /sys/devices/system/cpu/possible rather than the online set.
//! The possible set cannot change at runtime, which is what makes lane
//! counts safe to fix at startup.

use anyhow::{ensure, Context, Result};
use std::fs;

/// Number of possible CPUs, which is the lane count of every striped counter
///
/// # Errors
/// Returns an error if /sys is unavailable or the cpulist does not parse.
pub fn possible_cpu_count() -> Result<usize> {
    let content = fs::read_to_string("/sys/devices/system/cpu/possible")
        .context("Failed to read /sys/devices/system/cpu/possible")?;
    parse_cpu_list(&content)
}

/// Parse a kernel cpulist like "0", "0-3", or "0-3,8-11" into a CPU count
fn parse_cpu_list(content: &str) -> Result<usize> {
    let mut count = 0usize;

    for range in content.trim().split(',') {
        if let Some((start, end)) = range.split_once('-') {
            // Range like "0-3"
            let start: u32 = start.parse().with_context(|| format!("Bad cpu range: {range}"))?;
            let end: u32 = end.parse().with_context(|| format!("Bad cpu range: {range}"))?;
            ensure!(start <= end, "Bad cpu range: {range}");
            count += (end - start + 1) as usize;
        } else {
            // Single CPU like "5"
            let _: u32 = range.parse().with_context(|| format!("Bad cpu id: {range}"))?;
            count += 1;
        }
    }

    ensure!(count > 0, "Empty cpu list");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_cpu() {
        assert_eq!(parse_cpu_list("0\n").unwrap(), 1);
    }

    #[test]
    fn test_parse_simple_range() {
        assert_eq!(parse_cpu_list("0-3\n").unwrap(), 4);
    }

    #[test]
    fn test_parse_numa_style_list() {
        assert_eq!(parse_cpu_list("0-3,8-11").unwrap(), 8);
        assert_eq!(parse_cpu_list("0,2,4").unwrap(), 3);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_cpu_list("lots of cpus").is_err());
        assert!(parse_cpu_list("3-1").is_err());
        assert!(parse_cpu_list("").is_err());
    }

    #[test]
    fn test_possible_cpu_count_on_this_host() {
        // This test relies on /sys being available (Linux only)
        let result = possible_cpu_count();

        #[cfg(target_os = "linux")]
        assert!(result.expect("possible cpus readable") >= 1);

        #[cfg(not(target_os = "linux"))]
        assert!(result.is_err());
    }
}
