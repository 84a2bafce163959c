use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Strategy used to find out which process owns a listening port.
///
/// - `Auto`: use the native procfs lookup when `/proc/net/tcp` exists,
///   otherwise fall back to `lsof`.
/// - `Lsof`: always shell out to `lsof`.
/// - `Procfs`: always read the Linux socket tables directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverKind {
    Auto,
    Lsof,
    Procfs,
}

impl Default for ResolverKind {
    fn default() -> Self {
        ResolverKind::Auto
    }
}

impl FromStr for ResolverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(ResolverKind::Auto),
            "lsof" => Ok(ResolverKind::Lsof),
            "procfs" => Ok(ResolverKind::Procfs),
            other => Err(format!(
                "invalid resolver: {other} (expected \"auto\", \"lsof\" or \"procfs\")"
            )),
        }
    }
}

/// Termination signal sent to the managed process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    /// SIGTERM: ask the process to shut down.
    Graceful,
    /// SIGKILL: cannot be ignored.
    Forced,
}

impl fmt::Display for StopSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopSignal::Graceful => f.write_str("SIGTERM"),
            StopSignal::Forced => f.write_str("SIGKILL"),
        }
    }
}
