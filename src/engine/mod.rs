// src/engine/mod.rs

//! Control loop for hotreload.
//!
//! This module ties together:
//! - the snapshot scanner and change detector (`watch`)
//! - the process supervisor (`supervisor`)
//! - shutdown requests coming from SIGINT / SIGTERM
//!
//! The loop is strictly sequential: one scan, one decision, one supervisor
//! action at a time.

pub mod runtime;
pub mod shutdown;

pub use runtime::{SupervisorContext, TickReport};
pub use shutdown::{spawn_signal_listener, ShutdownFlag};
