//! Load generator for execwatch demos
//!
//! Spawns the command shapes that the tracepoint counts, so a local run
//! shows all three metrics moving.
//!
//! ## Usage
//!
//! ```bash
//! # Terminal 1: run the agent
//! sudo ./target/release/execwatch
//!
//! # Terminal 2: generate exec activity
//! cargo run --example exec-load
//!
//! # Terminal 3: watch the counters climb
//! watch -n1 'curl -s http://localhost:9110/metrics | grep ebpf_'
//! ```

use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

fn main() {
    println!("Spawning /bin/true and cat /etc/passwd once per second; Ctrl-C to stop");

    loop {
        // Plain exec: bumps only the exec counter
        let _ = Command::new("/bin/true").status();

        // Passwd read: bumps exec and passwd counters
        let _ = Command::new("cat").arg("/etc/passwd").stdout(Stdio::null()).status();

        thread::sleep(Duration::from_secs(1));
    }
}
