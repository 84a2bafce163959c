// src/exec/backend.rs

//! Pluggable process backend abstraction.
//!
//! The supervisor talks to a `ProcessBackend` instead of spawning processes
//! itself. This makes it easy to swap in a fake backend in tests while
//! keeping the production implementation in [`shell`](super::shell).
//!
//! - `ShellBackend` is the default implementation used by `hotreload`. It
//!   runs the service command through `sh -c` and signals it with `nix`.
//! - Tests can provide their own `ProcessBackend` that, for example, records
//!   which signals were sent and decides when a "process" exits.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::process::ExitStatus;

use crate::errors::Result;
use crate::types::StopSignal;

/// How a reaped process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitReport {
    pub pid: u32,
    /// Exit code, if the process exited normally.
    pub code: Option<i32>,
    /// Terminating signal number, if it was killed by one.
    pub signal: Option<i32>,
}

impl ExitReport {
    pub fn from_status(pid: u32, status: ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;

        Self {
            pid,
            code: status.code(),
            signal,
        }
    }
}

impl fmt::Display for ExitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.signal) {
            (Some(code), _) => write!(f, "exit code {code}"),
            (None, Some(sig)) => write!(f, "signal {sig}"),
            (None, None) => f.write_str("unknown status"),
        }
    }
}

/// Trait abstracting how the managed service process is run.
///
/// Processes are addressed by pid; an implementation only has to know about
/// the processes it spawned itself.
pub trait ProcessBackend: Send {
    /// Launch `cmd` through the platform shell and return its pid.
    fn spawn(&mut self, cmd: &str) -> Result<u32>;

    /// Non-blocking reap: `Some` once the process has exited.
    fn try_reap(&mut self, pid: u32) -> Result<Option<ExitReport>>;

    /// Deliver a termination signal. Signalling a process that has already
    /// exited (but is not yet reaped) is not an error.
    fn send_signal(&mut self, pid: u32, signal: StopSignal) -> Result<()>;

    /// Block until the process has exited and been reaped.
    fn wait(&mut self, pid: u32) -> Pin<Box<dyn Future<Output = Result<ExitReport>> + Send + '_>>;
}
