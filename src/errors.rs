// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HotReloadError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Failed to spawn `{cmd}`: {source}")]
    SpawnError {
        cmd: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to signal process {pid}: {reason}")]
    SignalError { pid: u32, reason: String },

    #[error("Process {0} is not tracked by this supervisor")]
    UnknownProcess(u32),

    #[error("Listener lookup failed for port {port}: {reason}")]
    ProbeError { port: u16, reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, HotReloadError>;
