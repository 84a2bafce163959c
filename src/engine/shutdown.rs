// src/engine/shutdown.rs

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tracing::{error, info};

/// Process-wide stop request.
///
/// The signal listener only ever calls [`ShutdownFlag::request`]; all the
/// blocking work (stopping the service, reaping it) stays in the control
/// loop, which polls the flag between steps and sleeps through
/// [`ShutdownFlag::sleep`] so a request cuts waits short.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    requested: AtomicBool,
    notify: Notify,
}

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.inner.requested.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_requested(&self) -> bool {
        self.inner.requested.load(Ordering::SeqCst)
    }

    /// Sleep for `duration` unless a stop is requested first.
    ///
    /// Returns `true` if the sleep was cut short (or a stop was already
    /// pending).
    pub async fn sleep(&self, duration: Duration) -> bool {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a concurrent request is not lost.
        notified.as_mut().enable();

        if self.is_requested() {
            return true;
        }

        tokio::select! {
            _ = tokio::time::sleep(duration) => self.is_requested(),
            _ = notified => true,
        }
    }
}

/// Listen for SIGINT / SIGTERM and turn the first one into a stop request.
pub fn spawn_signal_listener(flag: ShutdownFlag) {
    tokio::spawn(forward_termination(flag, wait_for_termination()));
}

/// A failed listener is logged and leaves the flag untouched.
async fn forward_termination<F>(flag: ShutdownFlag, termination: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = termination.await {
        error!(error = %e, "failed to listen for termination signals");
        return;
    }
    info!("termination signal received; stopping");
    flag.request();
}

#[cfg(unix)]
async fn wait_for_termination() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = interrupt.recv() => {}
        _ = terminate.recv() => {}
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_termination() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
