// src/supervisor/mod.rs

//! Lifecycle of the single managed service process.
//!
//! The [`Supervisor`] owns the child: it arbitrates the service port before
//! every start, spawns through a [`ProcessBackend`](crate::exec::ProcessBackend),
//! and stops with SIGTERM, escalating to SIGKILL after a bounded wait.

pub mod lifecycle;

use std::fmt;

pub use lifecycle::Supervisor;

/// Phase of the supervisor state machine.
///
/// ```text
/// Stopped -> Starting -> Running -> Restarting -> StoppingGraceful
///    ^          |           |                          |
///    |  conflict|           | exited                   v (timeout)
///    +----------+-----------+                    StoppingForced
///
/// any -> Terminated (shutdown)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Stopped,
    Starting,
    Running,
    StoppingGraceful,
    StoppingForced,
    Restarting,
    Terminated,
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SupervisorState::Stopped => "stopped",
            SupervisorState::Starting => "starting",
            SupervisorState::Running => "running",
            SupervisorState::StoppingGraceful => "stopping (graceful)",
            SupervisorState::StoppingForced => "stopping (forced)",
            SupervisorState::Restarting => "restarting",
            SupervisorState::Terminated => "terminated",
        };
        f.write_str(s)
    }
}

/// Result of a start attempt that did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new process was spawned with this pid.
    Started(u32),
    /// The port stayed held by another process (pid, when known) for the
    /// whole wait window; nothing was spawned.
    PortConflict(Option<u32>),
    /// A stop was requested while waiting for the port.
    Interrupted,
    /// The tracked process is still alive; nothing was spawned.
    AlreadyRunning(u32),
}

/// The supervised child as the supervisor sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedProcess {
    pid: Option<u32>,
    /// Pid of the most recently reaped child, still accepted as "ours" when
    /// arbitrating the port for its replacement.
    previous_pid: Option<u32>,
    command: String,
    port: u16,
}

impl ManagedProcess {
    pub fn new(command: impl Into<String>, port: u16) -> Self {
        Self {
            pid: None,
            previous_pid: None,
            command: command.into(),
            port,
        }
    }

    /// Pid of the live child; `None` once it has been reaped.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_running(&self) -> bool {
        self.pid.is_some()
    }

    fn owner_pid(&self) -> Option<u32> {
        self.pid.or(self.previous_pid)
    }

    fn launched(&mut self, pid: u32) {
        self.pid = Some(pid);
    }

    /// Only call after the backend confirmed the exit.
    fn reaped(&mut self) {
        if let Some(pid) = self.pid.take() {
            self.previous_pid = Some(pid);
        }
    }
}
