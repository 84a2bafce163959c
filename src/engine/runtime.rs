// src/engine/runtime.rs

use std::fmt;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::errors::Result;
use crate::exec::{ExitReport, ProcessBackend};
use crate::supervisor::{StartOutcome, Supervisor};
use crate::watch::{changed, ChangeSummary, FileSnapshot, SnapshotScanner};

use super::shutdown::ShutdownFlag;

/// What a single loop iteration did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The service exited on its own and a restart was attempted.
    pub crashed: Option<ExitReport>,
    /// The tracked sources changed and a restart was attempted.
    pub source_changed: bool,
}

/// Everything the control loop needs, passed explicitly instead of living in
/// globals.
///
/// - `supervisor` owns the child process.
/// - `scanner` + `baseline` implement change detection.
/// - `shutdown` is shared with the signal listener.
///
/// Loop shape: initial snapshot + start, then `tick` / sleep until a stop is
/// requested, then a final graceful shutdown. Every failure inside the loop
/// is logged and polling continues.
pub struct SupervisorContext<B: ProcessBackend> {
    supervisor: Supervisor<B>,
    scanner: SnapshotScanner,
    baseline: FileSnapshot,
    poll_interval: Duration,
    shutdown: ShutdownFlag,
}

impl<B: ProcessBackend> fmt::Debug for SupervisorContext<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupervisorContext")
            .field("supervisor", &self.supervisor)
            .field("tracked_files", &self.baseline.len())
            .finish_non_exhaustive()
    }
}

impl<B: ProcessBackend> SupervisorContext<B> {
    pub fn new(
        supervisor: Supervisor<B>,
        scanner: SnapshotScanner,
        poll_interval: Duration,
        shutdown: ShutdownFlag,
    ) -> Self {
        Self {
            supervisor,
            scanner,
            baseline: FileSnapshot::default(),
            poll_interval,
            shutdown,
        }
    }

    pub fn supervisor(&self) -> &Supervisor<B> {
        &self.supervisor
    }

    pub fn baseline(&self) -> &FileSnapshot {
        &self.baseline
    }

    /// Main loop. Returns once a stop was requested and the service is down.
    pub async fn run(mut self) -> Result<()> {
        info!(root = ?self.scanner.root(), poll = ?self.poll_interval, "hotreload started");
        self.startup().await;

        while !self.shutdown.is_requested() {
            self.tick().await;
            if self.shutdown.sleep(self.poll_interval).await {
                break;
            }
        }

        self.finish().await;
        Ok(())
    }

    /// Take the initial baseline and start the service.
    pub async fn startup(&mut self) {
        self.baseline = self.scanner.scan();
        info!(files = self.baseline.len(), "initial snapshot taken");
        self.start_service().await;
    }

    /// One polling iteration: crash recovery first, then change detection.
    pub async fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();

        match self.supervisor.poll_exit() {
            Ok(Some(exit)) => {
                warn!(pid = exit.pid, "restarting service due to exit");
                report.crashed = Some(exit);
                self.start_service().await;
                // Edits made while the service was down are covered by the
                // restart itself.
                self.baseline = self.scanner.scan();
            }
            Ok(None) => {}
            Err(e) => error!(error = %e, "failed to check service status"),
        }

        if self.shutdown.is_requested() {
            return report;
        }

        let current = self.scanner.scan();
        if changed(&self.baseline, &current) {
            let summary = ChangeSummary::between(&self.baseline, &current);
            debug!(
                added = ?summary.added,
                removed = ?summary.removed,
                modified = ?summary.modified,
                "source changes"
            );
            info!(changes = summary.total(), "change detected; restarting service");
            report.source_changed = true;

            match self.supervisor.restart().await {
                Ok(outcome) => log_start_outcome(outcome),
                Err(e) => error!(error = %e, "restart failed"),
            }
            self.baseline = current;
        }

        report
    }

    /// Final graceful shutdown of the service.
    pub async fn finish(&mut self) {
        info!("stop requested, shutting down");
        match self.supervisor.shutdown().await {
            Ok(Some(exit)) => info!(pid = exit.pid, status = %exit, "service shut down"),
            Ok(None) => debug!("no service running at shutdown"),
            Err(e) => error!(error = %e, "failed to stop service cleanly"),
        }
    }

    async fn start_service(&mut self) {
        match self.supervisor.start().await {
            Ok(outcome) => log_start_outcome(outcome),
            Err(e) => error!(error = %e, "failed to start service"),
        }
    }
}

fn log_start_outcome(outcome: StartOutcome) {
    match outcome {
        StartOutcome::Started(pid) => debug!(pid, "start complete"),
        StartOutcome::PortConflict(_) => {
            info!("service not running; waiting for the next change to retry")
        }
        StartOutcome::Interrupted => debug!("start interrupted by shutdown"),
        StartOutcome::AlreadyRunning(pid) => debug!(pid, "service already running"),
    }
}
