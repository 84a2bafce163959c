// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::ResolverKind;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [service]
/// cmd = "go run ./cmd/api/main.go"
/// port = 8080
///
/// [watch]
/// root = "."
/// extensions = [".go"]
/// exclude = ["vendor/**"]
/// poll_interval = "2s"
///
/// [timing]
/// port_wait_attempts = 10
/// graceful_wait_attempts = 5
/// ```
///
/// All sections are optional and have defaults matching a Go API project.
/// Convert into a [`ConfigFile`] with `ConfigFile::try_from`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub service: ServiceSection,

    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub timing: TimingSection,
}

/// `[service]` section: what to run and which port it binds.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceSection {
    /// Command line handed to `sh -c` verbatim.
    #[serde(default = "default_cmd")]
    pub cmd: String,

    /// TCP port the managed service listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// How listening pids are looked up.
    #[serde(default)]
    pub resolver: ResolverKind,
}

fn default_cmd() -> String {
    "go run ./cmd/api/main.go".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            cmd: default_cmd(),
            port: default_port(),
            resolver: ResolverKind::default(),
        }
    }
}

/// `[watch]` section: which files count as sources.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSection {
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// File-name suffixes to track. A leading dot is optional.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Glob patterns (relative to `root`) excluded from the scan.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Duration string such as `"2s"` or `"500ms"`.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_extensions() -> Vec<String> {
    vec![".go".to_string()]
}

fn default_poll_interval() -> String {
    "2s".to_string()
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            root: default_root(),
            extensions: default_extensions(),
            exclude: Vec::new(),
            poll_interval: default_poll_interval(),
        }
    }
}

/// `[timing]` section: bounds for the supervisor's retry loops.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimingSection {
    #[serde(default = "default_port_wait_attempts")]
    pub port_wait_attempts: u32,

    #[serde(default = "default_one_second")]
    pub port_wait_interval: String,

    #[serde(default = "default_graceful_wait_attempts")]
    pub graceful_wait_attempts: u32,

    #[serde(default = "default_one_second")]
    pub graceful_wait_interval: String,

    #[serde(default = "default_probe_timeout")]
    pub probe_timeout: String,
}

fn default_port_wait_attempts() -> u32 {
    10
}

fn default_graceful_wait_attempts() -> u32 {
    5
}

fn default_one_second() -> String {
    "1s".to_string()
}

fn default_probe_timeout() -> String {
    "500ms".to_string()
}

impl Default for TimingSection {
    fn default() -> Self {
        Self {
            port_wait_attempts: default_port_wait_attempts(),
            port_wait_interval: default_one_second(),
            graceful_wait_attempts: default_graceful_wait_attempts(),
            graceful_wait_interval: default_one_second(),
            probe_timeout: default_probe_timeout(),
        }
    }
}

/// Validated configuration.
///
/// Only obtainable through `ConfigFile::try_from(RawConfigFile)` (or
/// [`ConfigFile::default`]), so every field is known to be usable.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub service: ServiceConfig,
    pub watch: WatchConfig,
    pub timing: Timings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub cmd: String,
    pub port: u16,
    pub resolver: ResolverKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    pub root: PathBuf,
    /// Normalised suffixes, always starting with `.`.
    pub extensions: Vec<String>,
    pub exclude: Vec<String>,
    pub poll_interval: Duration,
}

/// Retry bounds used by the supervisor and the port probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub port_wait_attempts: u32,
    pub port_wait_interval: Duration,
    pub graceful_wait_attempts: u32,
    pub graceful_wait_interval: Duration,
    pub probe_timeout: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            port_wait_attempts: 10,
            port_wait_interval: Duration::from_secs(1),
            graceful_wait_attempts: 5,
            graceful_wait_interval: Duration::from_secs(1),
            probe_timeout: Duration::from_millis(500),
        }
    }
}

impl ConfigFile {
    pub(crate) fn new_unchecked(service: ServiceConfig, watch: WatchConfig, timing: Timings) -> Self {
        Self {
            service,
            watch,
            timing,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                cmd: default_cmd(),
                port: default_port(),
                resolver: ResolverKind::default(),
            },
            watch: WatchConfig {
                root: default_root(),
                extensions: default_extensions(),
                exclude: Vec::new(),
                poll_interval: Duration::from_secs(2),
            },
            timing: Timings::default(),
        }
    }
}
