//! Monitored event classes.
//!
//! Each class binds one kernel-side per-CPU array map to one Prometheus
//! counter. The set is fixed at startup; adding a class means adding a map
//! to the eBPF program and a variant here.

/// Exec activity classes counted by the kernel program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventClass {
    /// Every `execve` invocation
    Exec,
    /// Invocations of a binary whose path ends in `/sudo`
    Sudo,
    /// `cat /etc/passwd`, directly or via sudo
    PasswdRead,
}

impl EventClass {
    /// All monitored classes, in registration and polling order
    pub const ALL: [EventClass; 3] = [EventClass::Exec, EventClass::Sudo, EventClass::PasswdRead];

    /// Name of the kernel map holding this class's striped counter
    #[must_use]
    pub fn map_name(self) -> &'static str {
        match self {
            EventClass::Exec => "EXEC_EVENTS",
            EventClass::Sudo => "SUDO_EVENTS",
            EventClass::PasswdRead => "PASSWD_READ_EVENTS",
        }
    }

    /// Prometheus metric name this class is published under
    #[must_use]
    pub fn metric_name(self) -> &'static str {
        match self {
            EventClass::Exec => "ebpf_exec_events_total",
            EventClass::Sudo => "ebpf_sudo_events_total",
            EventClass::PasswdRead => "ebpf_passwd_read_events_total",
        }
    }

    /// Help text attached to the Prometheus counter
    #[must_use]
    pub fn help(self) -> &'static str {
        match self {
            EventClass::Exec => "Total execve events recorded by eBPF",
            EventClass::Sudo => "Total sudo privilege escalation events recorded by eBPF",
            EventClass::PasswdRead => {
                "Total /etc/passwd read attempts (cat /etc/passwd or sudo cat /etc/passwd) \
                 recorded by eBPF"
            }
        }
    }
}
