use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hotreload::errors::{HotReloadError, Result};
use hotreload::exec::{ExitReport, ProcessBackend};
use hotreload::types::StopSignal;

const FIRST_PID: u32 = 40_000;

#[derive(Debug, Default)]
struct FakeState {
    next_pid: u32,
    spawned: Vec<(u32, String)>,
    signals: Vec<(u32, StopSignal)>,
    alive: HashSet<u32>,
    /// Exited but not yet reaped.
    exited: HashMap<u32, ExitReport>,
    exits_on_graceful: bool,
}

/// Shared view into a [`FakeProcessBackend`], kept by the test after the
/// backend has been moved into a supervisor.
#[derive(Debug, Clone, Default)]
pub struct FakeBackendHandle {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBackendHandle {
    /// Every spawn so far, as `(pid, cmd)`.
    pub fn spawned(&self) -> Vec<(u32, String)> {
        self.state.lock().unwrap().spawned.clone()
    }

    pub fn spawn_count(&self) -> usize {
        self.state.lock().unwrap().spawned.len()
    }

    /// Every signal delivered so far, in order.
    pub fn signals(&self) -> Vec<(u32, StopSignal)> {
        self.state.lock().unwrap().signals.clone()
    }

    pub fn signals_to(&self, pid: u32) -> Vec<StopSignal> {
        self.signals()
            .into_iter()
            .filter(|(p, _)| *p == pid)
            .map(|(_, s)| s)
            .collect()
    }

    pub fn is_alive(&self, pid: u32) -> bool {
        self.state.lock().unwrap().alive.contains(&pid)
    }

    /// Whether SIGTERM makes a fake process exit (SIGKILL always does).
    pub fn set_exits_on_graceful(&self, yes: bool) {
        self.state.lock().unwrap().exits_on_graceful = yes;
    }

    /// Simulate the process exiting on its own with `code`.
    pub fn exit(&self, pid: u32, code: i32) {
        let mut st = self.state.lock().unwrap();
        if st.alive.remove(&pid) {
            st.exited.insert(
                pid,
                ExitReport {
                    pid,
                    code: Some(code),
                    signal: None,
                },
            );
        }
    }
}

/// A fake process backend that:
/// - hands out increasing pids without running anything
/// - records spawns and signals
/// - "exits" processes on SIGKILL, on SIGTERM when configured to, or when
///   the test calls [`FakeBackendHandle::exit`].
#[derive(Debug)]
pub struct FakeProcessBackend {
    handle: FakeBackendHandle,
}

impl FakeProcessBackend {
    /// Backend whose processes exit on SIGTERM.
    pub fn new() -> (Self, FakeBackendHandle) {
        let handle = FakeBackendHandle::default();
        {
            let mut st = handle.state.lock().unwrap();
            st.next_pid = FIRST_PID;
            st.exits_on_graceful = true;
        }
        (
            Self {
                handle: handle.clone(),
            },
            handle,
        )
    }

    /// Backend whose processes ignore SIGTERM.
    pub fn stubborn() -> (Self, FakeBackendHandle) {
        let (backend, handle) = Self::new();
        handle.set_exits_on_graceful(false);
        (backend, handle)
    }
}

impl ProcessBackend for FakeProcessBackend {
    fn spawn(&mut self, cmd: &str) -> Result<u32> {
        let mut st = self.handle.state.lock().unwrap();
        let pid = st.next_pid;
        st.next_pid += 1;
        st.alive.insert(pid);
        st.spawned.push((pid, cmd.to_string()));
        Ok(pid)
    }

    fn try_reap(&mut self, pid: u32) -> Result<Option<ExitReport>> {
        let mut st = self.handle.state.lock().unwrap();
        if let Some(report) = st.exited.remove(&pid) {
            return Ok(Some(report));
        }
        if st.alive.contains(&pid) {
            Ok(None)
        } else {
            Err(HotReloadError::UnknownProcess(pid))
        }
    }

    fn send_signal(&mut self, pid: u32, signal: StopSignal) -> Result<()> {
        let mut st = self.handle.state.lock().unwrap();
        st.signals.push((pid, signal));

        let exits = match signal {
            StopSignal::Forced => true,
            StopSignal::Graceful => st.exits_on_graceful,
        };
        if exits && st.alive.remove(&pid) {
            let signo = match signal {
                StopSignal::Graceful => 15,
                StopSignal::Forced => 9,
            };
            st.exited.insert(
                pid,
                ExitReport {
                    pid,
                    code: None,
                    signal: Some(signo),
                },
            );
        }
        Ok(())
    }

    fn wait(&mut self, pid: u32) -> Pin<Box<dyn Future<Output = Result<ExitReport>> + Send + '_>> {
        Box::pin(async move {
            loop {
                if let Some(report) = self.try_reap(pid)? {
                    return Ok(report);
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
    }
}
