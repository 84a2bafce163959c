// src/supervisor/lifecycle.rs

use tracing::{debug, error, info, warn};

use crate::config::Timings;
use crate::engine::shutdown::ShutdownFlag;
use crate::errors::Result;
use crate::exec::{ExitReport, ProcessBackend};
use crate::port::{PortProbe, PortState};
use crate::types::StopSignal;

use super::{ManagedProcess, StartOutcome, SupervisorState};

/// Outcome of the pre-start port arbitration.
enum PortWait {
    Clear,
    Conflict(Option<u32>),
    Interrupted,
}

/// Owns the managed process and drives its state machine.
///
/// Ordering guarantee: a new child is only spawned once the previous one has
/// been confirmed dead (reaped, or killed and waited for). The tracked pid is
/// cleared only on that confirmation.
pub struct Supervisor<B: ProcessBackend> {
    backend: B,
    probe: PortProbe,
    process: ManagedProcess,
    state: SupervisorState,
    timings: Timings,
    shutdown: ShutdownFlag,
}

impl<B: ProcessBackend> std::fmt::Debug for Supervisor<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("process", &self.process)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<B: ProcessBackend> Supervisor<B> {
    pub fn new(
        backend: B,
        probe: PortProbe,
        process: ManagedProcess,
        timings: Timings,
        shutdown: ShutdownFlag,
    ) -> Self {
        Self {
            backend,
            probe,
            process,
            state: SupervisorState::Stopped,
            timings,
            shutdown,
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    pub fn process(&self) -> &ManagedProcess {
        &self.process
    }

    pub fn pid(&self) -> Option<u32> {
        self.process.pid()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// `Stopped -> Starting -> Running`, or back to `Stopped` when the port
    /// cannot be had.
    pub async fn start(&mut self) -> Result<StartOutcome> {
        if let Some(pid) = self.process.pid() {
            debug!(pid, "start requested while the service is running; ignoring");
            return Ok(StartOutcome::AlreadyRunning(pid));
        }

        self.state = SupervisorState::Starting;
        let port = self.process.port();
        info!(port, cmd = %self.process.command(), "starting service");

        match self.await_port().await {
            PortWait::Clear => {}
            PortWait::Conflict(holder) => {
                match holder {
                    Some(pid) => error!(
                        port,
                        holder = pid,
                        "port is used by another process; not starting to avoid conflict"
                    ),
                    None => error!(
                        port,
                        "port is held by an unidentified process; not starting to avoid conflict"
                    ),
                }
                self.state = SupervisorState::Stopped;
                return Ok(StartOutcome::PortConflict(holder));
            }
            PortWait::Interrupted => {
                info!(port, "stop requested while waiting for the port; not starting");
                self.state = SupervisorState::Stopped;
                return Ok(StartOutcome::Interrupted);
            }
        }

        match self.backend.spawn(self.process.command()) {
            Ok(pid) => {
                self.process.launched(pid);
                self.state = SupervisorState::Running;
                info!(pid, port, "service started");
                Ok(StartOutcome::Started(pid))
            }
            Err(e) => {
                self.state = SupervisorState::Stopped;
                Err(e)
            }
        }
    }

    /// Poll the port until it is free or held by our own (previous) child.
    async fn await_port(&mut self) -> PortWait {
        let port = self.process.port();
        let attempts = self.timings.port_wait_attempts.max(1);

        let mut holder = None;
        for attempt in 1..=attempts {
            let state = self.probe.probe(port, self.process.owner_pid()).await;
            if !state.is_conflict() {
                return PortWait::Clear;
            }
            if let PortState::HeldByOther(pid) = state {
                holder = pid;
            }

            if attempt == attempts {
                break;
            }
            warn!(port, attempt, attempts, holder = ?holder, "port busy; waiting");
            if self.shutdown.sleep(self.timings.port_wait_interval).await {
                return PortWait::Interrupted;
            }
        }

        PortWait::Conflict(holder)
    }

    /// Non-blocking liveness check. Returns the exit report when the child
    /// has exited on its own; the supervisor is then `Stopped`.
    pub fn poll_exit(&mut self) -> Result<Option<ExitReport>> {
        let Some(pid) = self.process.pid() else {
            return Ok(None);
        };

        let report = self.backend.try_reap(pid)?;
        if let Some(report) = report {
            self.process.reaped();
            self.state = SupervisorState::Stopped;
            warn!(pid, status = %report, "service exited");
        }
        Ok(report)
    }

    /// SIGTERM, bounded wait, then SIGKILL and wait. No-op when nothing runs.
    pub async fn stop(&mut self) -> Result<Option<ExitReport>> {
        let Some(pid) = self.process.pid() else {
            return Ok(None);
        };

        self.state = SupervisorState::StoppingGraceful;
        match self.backend.send_signal(pid, StopSignal::Graceful) {
            Ok(()) => {
                if let Some(report) = self.await_graceful_exit(pid).await? {
                    info!(pid, status = %report, "service stopped");
                    return Ok(Some(report));
                }
                warn!(pid, "service did not exit gracefully, killing");
            }
            Err(e) => warn!(pid, error = %e, "graceful stop failed; killing"),
        }

        self.state = SupervisorState::StoppingForced;
        self.backend.send_signal(pid, StopSignal::Forced)?;
        let report = self.backend.wait(pid).await?;
        self.process.reaped();
        self.state = SupervisorState::Stopped;
        info!(pid, status = %report, "service killed");
        Ok(Some(report))
    }

    async fn await_graceful_exit(&mut self, pid: u32) -> Result<Option<ExitReport>> {
        for _ in 0..self.timings.graceful_wait_attempts {
            if let Some(report) = self.reap(pid)? {
                return Ok(Some(report));
            }
            tokio::time::sleep(self.timings.graceful_wait_interval).await;
        }
        self.reap(pid)
    }

    fn reap(&mut self, pid: u32) -> Result<Option<ExitReport>> {
        let report = self.backend.try_reap(pid)?;
        if report.is_some() {
            self.process.reaped();
            self.state = SupervisorState::Stopped;
        }
        Ok(report)
    }

    /// `Running -> Restarting`: stop the current child (if any), then start a
    /// single replacement.
    pub async fn restart(&mut self) -> Result<StartOutcome> {
        self.state = SupervisorState::Restarting;
        if let Some(pid) = self.process.pid() {
            info!(pid, "restarting service");
        }

        if let Err(e) = self.stop().await {
            // Still tracked and possibly alive: never start a second copy.
            self.state = if self.process.is_running() {
                SupervisorState::Running
            } else {
                SupervisorState::Stopped
            };
            return Err(e);
        }

        self.start().await
    }

    /// Final stop on process-wide shutdown. The supervisor ends `Terminated`
    /// and never restarts.
    pub async fn shutdown(&mut self) -> Result<Option<ExitReport>> {
        let result = self.stop().await;
        if !self.process.is_running() {
            self.state = SupervisorState::Terminated;
        }
        result
    }
}
