// src/port/probe.rs

use std::io::ErrorKind;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::port::resolver::ListenerResolver;

/// Point-in-time occupancy of the service port. Never cache it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortState {
    /// Nothing accepted the connection.
    Free,
    /// The listener is the process we are tracking.
    HeldByUs,
    /// Someone else is listening; `None` when the owner could not be
    /// resolved or the probe was inconclusive.
    HeldByOther(Option<u32>),
}

impl PortState {
    /// Whether starting the service now would risk a bind collision.
    pub fn is_conflict(&self) -> bool {
        matches!(self, PortState::HeldByOther(_))
    }
}

/// Local TCP probe plus listener-table lookup.
///
/// A connect to `127.0.0.1:<port>` decides whether anything listens at all;
/// only then is the resolver asked who owns it. Any result other than a clean
/// "connection refused" is treated as occupied.
#[derive(Debug, Clone)]
pub struct PortProbe {
    resolver: Arc<dyn ListenerResolver>,
    connect_timeout: Duration,
}

impl PortProbe {
    pub fn new(resolver: Arc<dyn ListenerResolver>, connect_timeout: Duration) -> Self {
        Self {
            resolver,
            connect_timeout,
        }
    }

    pub async fn probe(&self, port: u16, our_pid: Option<u32>) -> PortState {
        match timeout(self.connect_timeout, TcpStream::connect(("127.0.0.1", port))).await {
            Ok(Ok(_stream)) => {}
            Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => {
                debug!(port, "port is free");
                return PortState::Free;
            }
            Ok(Err(e)) => {
                debug!(port, error = %e, "inconclusive connect; assuming occupied");
                return PortState::HeldByOther(None);
            }
            Err(_) => {
                debug!(port, timeout = ?self.connect_timeout, "connect timed out; assuming occupied");
                return PortState::HeldByOther(None);
            }
        }

        let owner = match self.resolver.listening_pid(port).await {
            Ok(owner) => owner,
            Err(e) => {
                warn!(port, error = %e, "could not resolve listener owner");
                None
            }
        };

        let state = match owner {
            Some(pid) if Some(pid) == our_pid => PortState::HeldByUs,
            other => PortState::HeldByOther(other),
        };
        debug!(port, ?state, "port is in use");
        state
    }

    /// The pid of a foreign listener on `port`, if one can be named.
    ///
    /// `None` covers both a free port and a foreign listener whose owner
    /// could not be resolved. Callers that must treat the latter as a
    /// conflict use [`PortProbe::probe`] and [`PortState::is_conflict`].
    pub async fn foreign_holder(&self, port: u16, our_pid: Option<u32>) -> Option<u32> {
        match self.probe(port, our_pid).await {
            PortState::HeldByOther(pid) => pid,
            PortState::Free | PortState::HeldByUs => None,
        }
    }
}
