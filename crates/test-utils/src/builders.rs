#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use hotreload::config::{ConfigFile, RawConfigFile, Timings};
use hotreload::engine::ShutdownFlag;
use hotreload::exec::ProcessBackend;
use hotreload::port::{ListenerResolver, PortProbe};
use hotreload::supervisor::{ManagedProcess, Supervisor};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn cmd(mut self, cmd: &str) -> Self {
        self.config.service.cmd = cmd.to_string();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.service.port = port;
        self
    }

    pub fn root(mut self, root: impl AsRef<Path>) -> Self {
        self.config.watch.root = root.as_ref().to_path_buf();
        self
    }

    pub fn extension(mut self, ext: &str) -> Self {
        self.config.watch.extensions.push(ext.to_string());
        self
    }

    pub fn only_extension(mut self, ext: &str) -> Self {
        self.config.watch.extensions = vec![ext.to_string()];
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.config.watch.exclude.push(pattern.to_string());
        self
    }

    pub fn poll_interval(mut self, interval: &str) -> Self {
        self.config.watch.poll_interval = interval.to_string();
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Millisecond-scale timings so supervisor tests finish quickly.
pub fn fast_timings() -> Timings {
    Timings {
        port_wait_attempts: 3,
        port_wait_interval: Duration::from_millis(10),
        graceful_wait_attempts: 3,
        graceful_wait_interval: Duration::from_millis(10),
        probe_timeout: Duration::from_millis(200),
    }
}

/// A supervisor over `backend` for the service `cmd` on `port`, using
/// [`fast_timings`].
pub fn supervisor_with<B: ProcessBackend>(
    backend: B,
    resolver: Arc<dyn ListenerResolver>,
    cmd: &str,
    port: u16,
    shutdown: ShutdownFlag,
) -> Supervisor<B> {
    let timings = fast_timings();
    Supervisor::new(
        backend,
        PortProbe::new(resolver, timings.probe_timeout),
        ManagedProcess::new(cmd, port),
        timings,
        shutdown,
    )
}

/// A local port with nothing listening on it (at the time of the call).
pub fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral port");
    listener.local_addr().expect("local addr").port()
}
