// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::RawConfigFile;

/// Command-line arguments for `hotreload`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "hotreload",
    version,
    about = "Restart a development server whenever its sources change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `HotReload.toml` in the current working directory, if it
    /// exists; otherwise built-in defaults are used.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Shell command that runs the service (overrides `[service].cmd`).
    #[arg(long, value_name = "CMD")]
    pub cmd: Option<String>,

    /// Port the service listens on (overrides `[service].port`).
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Directory to watch (overrides `[watch].root`).
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Tracked file extension; repeat for several (overrides
    /// `[watch].extensions`).
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Poll interval such as `2s` or `500ms` (overrides
    /// `[watch].poll_interval`).
    #[arg(long, value_name = "DURATION")]
    pub poll_interval: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `HOTRELOAD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load and validate the config, print the effective settings, but
    /// don't start anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// Apply command-line overrides on top of a loaded config.
    pub fn apply_overrides(&self, raw: &mut RawConfigFile) {
        if let Some(cmd) = &self.cmd {
            raw.service.cmd = cmd.clone();
        }
        if let Some(port) = self.port {
            raw.service.port = port;
        }
        if let Some(root) = &self.root {
            raw.watch.root = root.clone();
        }
        if !self.extensions.is_empty() {
            raw.watch.extensions = self.extensions.clone();
        }
        if let Some(interval) = &self.poll_interval {
            raw.watch.poll_interval = interval.clone();
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
