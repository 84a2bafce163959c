// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`backend`] provides the `ProcessBackend` trait the supervisor drives,
//!   which tests can replace with a fake implementation.
//! - [`shell`] is the real backend: `sh -c` children managed with
//!   `tokio::process` and signalled with `nix`.

pub mod backend;
pub mod shell;

pub use backend::{ExitReport, ProcessBackend};
pub use shell::ShellBackend;
