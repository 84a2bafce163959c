// src/exec/shell.rs

//! Production process backend: `sh -c <cmd>` children owned by tokio.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::{Child, Command};
use tracing::{debug, info};

use crate::errors::{HotReloadError, Result};
use crate::exec::backend::{ExitReport, ProcessBackend};
use crate::types::StopSignal;

/// Runs the service command through the platform shell.
///
/// On Unix each child is made the leader of a new process group and signals
/// go to the whole group, so `go run`-style wrappers take their compiled
/// binary down with them. stdout/stderr are inherited: the service's output
/// goes straight to the terminal and is never inspected.
#[derive(Debug, Default)]
pub struct ShellBackend {
    children: HashMap<u32, Child>,
}

impl ShellBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn child_mut(&mut self, pid: u32) -> Result<&mut Child> {
        self.children
            .get_mut(&pid)
            .ok_or(HotReloadError::UnknownProcess(pid))
    }
}

impl ProcessBackend for ShellBackend {
    fn spawn(&mut self, cmd: &str) -> Result<u32> {
        // Build a shell command appropriate for the platform.
        let mut command = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(cmd);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(cmd);
            c
        };

        command
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        #[cfg(unix)]
        command.process_group(0);

        let child = command.spawn().map_err(|source| HotReloadError::SpawnError {
            cmd: cmd.to_string(),
            source,
        })?;

        let pid = child.id().ok_or_else(|| HotReloadError::SpawnError {
            cmd: cmd.to_string(),
            source: std::io::Error::other("child exited before its pid was read"),
        })?;

        debug!(pid, cmd = %cmd, "spawned service process");
        self.children.insert(pid, child);
        Ok(pid)
    }

    fn try_reap(&mut self, pid: u32) -> Result<Option<ExitReport>> {
        let status = self.child_mut(pid)?.try_wait()?;
        Ok(status.map(|status| {
            self.children.remove(&pid);
            ExitReport::from_status(pid, status)
        }))
    }

    fn send_signal(&mut self, pid: u32, signal: StopSignal) -> Result<()> {
        let child = self.child_mut(pid)?;
        info!(pid, %signal, "signalling service process group");
        deliver(child, pid, signal)
    }

    fn wait(&mut self, pid: u32) -> Pin<Box<dyn Future<Output = Result<ExitReport>> + Send + '_>> {
        Box::pin(async move {
            let status = self.child_mut(pid)?.wait().await?;
            self.children.remove(&pid);
            Ok(ExitReport::from_status(pid, status))
        })
    }
}

#[cfg(unix)]
fn deliver(_child: &mut Child, pid: u32, signal: StopSignal) -> Result<()> {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let sig = match signal {
        StopSignal::Graceful => Signal::SIGTERM,
        StopSignal::Forced => Signal::SIGKILL,
    };

    match killpg(Pid::from_raw(pid as i32), sig) {
        Ok(()) => Ok(()),
        // Already gone; the next reap reports it.
        Err(Errno::ESRCH) => Ok(()),
        Err(e) => Err(HotReloadError::SignalError {
            pid,
            reason: e.to_string(),
        }),
    }
}

#[cfg(not(unix))]
fn deliver(child: &mut Child, pid: u32, _signal: StopSignal) -> Result<()> {
    // No SIGTERM equivalent; terminate immediately.
    child.start_kill().map_err(|e| HotReloadError::SignalError {
        pid,
        reason: e.to_string(),
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    async fn reap_within(backend: &mut ShellBackend, pid: u32, limit: Duration) -> Option<ExitReport> {
        let deadline = tokio::time::Instant::now() + limit;
        while tokio::time::Instant::now() < deadline {
            if let Some(report) = backend.try_reap(pid).unwrap() {
                return Some(report);
            }
            sleep(Duration::from_millis(20)).await;
        }
        None
    }

    #[tokio::test]
    async fn exited_child_is_reaped_with_its_code() {
        let mut backend = ShellBackend::new();
        let pid = backend.spawn("exit 3").unwrap();

        let report = reap_within(&mut backend, pid, Duration::from_secs(5))
            .await
            .expect("child should exit");
        assert_eq!(report.pid, pid);
        assert_eq!(report.code, Some(3));

        // Reaped children are forgotten.
        assert!(matches!(
            backend.try_reap(pid),
            Err(HotReloadError::UnknownProcess(p)) if p == pid
        ));
    }

    #[tokio::test]
    async fn graceful_signal_stops_a_sleeping_child() {
        let mut backend = ShellBackend::new();
        let pid = backend.spawn("sleep 30").unwrap();
        assert!(backend.try_reap(pid).unwrap().is_none());

        backend.send_signal(pid, StopSignal::Graceful).unwrap();
        let report = backend.wait(pid).await.unwrap();
        assert_eq!((report.code, report.signal), (None, Some(15)));
    }

    #[tokio::test]
    async fn forced_signal_kills_a_child_ignoring_sigterm() {
        let mut backend = ShellBackend::new();
        let pid = backend.spawn("trap '' TERM; while :; do sleep 1; done").unwrap();
        sleep(Duration::from_millis(200)).await;

        backend.send_signal(pid, StopSignal::Graceful).unwrap();
        assert!(reap_within(&mut backend, pid, Duration::from_millis(300)).await.is_none());

        backend.send_signal(pid, StopSignal::Forced).unwrap();
        let report = backend.wait(pid).await.unwrap();
        assert_eq!(report.signal, Some(9));
    }

    #[test]
    fn unknown_pids_are_rejected() {
        let mut backend = ShellBackend::new();
        assert!(matches!(
            backend.send_signal(424242, StopSignal::Graceful),
            Err(HotReloadError::UnknownProcess(424242))
        ));
    }
}
