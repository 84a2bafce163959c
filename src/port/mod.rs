// src/port/mod.rs

//! Service-port occupancy checks.
//!
//! - [`probe`] answers "is the port free, ours, or someone else's?".
//! - [`resolver`] provides the listener-table lookups behind it.

pub mod probe;
pub mod resolver;

pub use probe::{PortProbe, PortState};
pub use resolver::{resolver_for, ListenerResolver, LsofResolver, ProcfsResolver};
