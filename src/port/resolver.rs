// src/port/resolver.rs

//! Pluggable "who is listening on this port?" lookup.
//!
//! - [`LsofResolver`] shells out to `lsof`, which works on macOS and most
//!   Linux distributions.
//! - [`ProcfsResolver`] reads `/proc/net/tcp{,6}` and matches socket inodes
//!   against `/proc/<pid>/fd`, with no external tools.
//!
//! Tests can provide their own implementation returning a fixed pid.

use std::collections::HashSet;
use std::fmt::Debug;
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;
use std::sync::Arc;

use tokio::process::Command;
use tracing::{debug, trace};

use crate::errors::{HotReloadError, Result};
use crate::types::ResolverKind;

/// Resolve the pid owning a listening TCP socket on a local port.
pub trait ListenerResolver: Send + Sync + Debug {
    /// `Ok(None)` means the listener table has no entry for `port`.
    fn listening_pid(
        &self,
        port: u16,
    ) -> Pin<Box<dyn Future<Output = Result<Option<u32>>> + Send + '_>>;
}

/// Pick the resolver for a configured [`ResolverKind`].
pub fn resolver_for(kind: ResolverKind) -> Arc<dyn ListenerResolver> {
    match kind {
        ResolverKind::Lsof => Arc::new(LsofResolver),
        ResolverKind::Procfs => Arc::new(ProcfsResolver::default()),
        ResolverKind::Auto => {
            if Path::new("/proc/net/tcp").exists() {
                debug!("using procfs listener resolver");
                Arc::new(ProcfsResolver::default())
            } else {
                debug!("using lsof listener resolver");
                Arc::new(LsofResolver)
            }
        }
    }
}

/// Runs `lsof -iTCP:<port> -sTCP:LISTEN -n -P -F p`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LsofResolver;

impl ListenerResolver for LsofResolver {
    fn listening_pid(
        &self,
        port: u16,
    ) -> Pin<Box<dyn Future<Output = Result<Option<u32>>> + Send + '_>> {
        Box::pin(async move {
            let output = Command::new("lsof")
                .arg(format!("-iTCP:{port}"))
                .args(["-sTCP:LISTEN", "-n", "-P", "-F", "p"])
                .stdin(Stdio::null())
                .stderr(Stdio::null())
                .output()
                .await
                .map_err(|e| HotReloadError::ProbeError {
                    port,
                    reason: format!("running lsof: {e}"),
                })?;

            // lsof exits 1 when nothing matched; the empty output covers it.
            let stdout = String::from_utf8_lossy(&output.stdout);
            let pid = parse_lsof_pid(&stdout);
            trace!(port, ?pid, status = ?output.status, "lsof lookup finished");
            Ok(pid)
        })
    }
}

/// First `p<pid>` record of `lsof -F p` output.
pub fn parse_lsof_pid(output: &str) -> Option<u32> {
    output
        .lines()
        .filter_map(|line| line.strip_prefix('p'))
        .find_map(|pid| pid.trim().parse().ok())
}

/// Native Linux lookup via `/proc`.
#[derive(Debug, Clone)]
pub struct ProcfsResolver {
    proc_root: PathBuf,
}

impl Default for ProcfsResolver {
    fn default() -> Self {
        Self {
            proc_root: PathBuf::from("/proc"),
        }
    }
}

impl ProcfsResolver {
    /// Use a different mount point than `/proc` (tests, containers).
    pub fn with_root(proc_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
        }
    }

    fn lookup(&self, port: u16) -> Result<Option<u32>> {
        let mut inodes = HashSet::new();
        let mut any_table = false;
        for table in ["net/tcp", "net/tcp6"] {
            let path = self.proc_root.join(table);
            match fs::read_to_string(&path) {
                Ok(contents) => {
                    any_table = true;
                    inodes.extend(listening_inodes(&contents, port));
                }
                Err(e) => trace!(?path, error = %e, "socket table unavailable"),
            }
        }

        if !any_table {
            return Err(HotReloadError::ProbeError {
                port,
                reason: format!("no socket tables under {:?}", self.proc_root),
            });
        }
        if inodes.is_empty() {
            return Ok(None);
        }

        let mut pids: Vec<u32> = fs::read_dir(&self.proc_root)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().to_str()?.parse().ok())
            .collect();
        pids.sort_unstable();

        Ok(pids
            .into_iter()
            .find(|pid| self.owns_any_socket(*pid, &inodes)))
    }

    fn owns_any_socket(&self, pid: u32, inodes: &HashSet<u64>) -> bool {
        // Other users' processes are unreadable; they simply do not match.
        let Ok(fds) = fs::read_dir(self.proc_root.join(pid.to_string()).join("fd")) else {
            return false;
        };

        fds.filter_map(|fd| fd.ok())
            .filter_map(|fd| fs::read_link(fd.path()).ok())
            .filter_map(|target| socket_inode(&target.to_string_lossy()))
            .any(|inode| inodes.contains(&inode))
    }
}

impl ListenerResolver for ProcfsResolver {
    fn listening_pid(
        &self,
        port: u16,
    ) -> Pin<Box<dyn Future<Output = Result<Option<u32>>> + Send + '_>> {
        Box::pin(async move {
            let resolver = self.clone();
            tokio::task::spawn_blocking(move || resolver.lookup(port))
                .await
                .map_err(|e| HotReloadError::ProbeError {
                    port,
                    reason: format!("procfs lookup task failed: {e}"),
                })?
        })
    }
}

/// TCP state code for LISTEN in `/proc/net/tcp`.
const TCP_LISTEN: &str = "0A";

/// Inodes of LISTEN sockets bound to `port` in a `/proc/net/tcp` table.
pub fn listening_inodes(table: &str, port: u16) -> Vec<u64> {
    table
        .lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 10 || fields[3] != TCP_LISTEN {
                return None;
            }
            let (_, port_hex) = fields[1].rsplit_once(':')?;
            let local_port = u16::from_str_radix(port_hex, 16).ok()?;
            if local_port != port {
                return None;
            }
            fields[9].parse().ok()
        })
        .collect()
}

/// `socket:[12345]` -> `12345`.
fn socket_inode(link: &str) -> Option<u64> {
    link.strip_prefix("socket:[")?.strip_suffix(']')?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TCP_TABLE: &str = "\
  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
   0: 0100007F:1F90 00000000:0000 0A 00000000:00000000 00:00000000 00000000  1000        0 4242 1 0000000000000000 100 0 0 10 0
   1: 0100007F:1F90 0100007F:C350 01 00000000:00000000 00:00000000 00000000  1000        0 5151 1 0000000000000000 20 4 30 10 -1
   2: 00000000:0016 00000000:0000 0A 00000000:00000000 00:00000000 00000000     0        0 999 1 0000000000000000 100 0 0 10 0
";

    #[test]
    fn lsof_output_yields_first_pid() {
        assert_eq!(parse_lsof_pid("p1234\nf7\np5678\n"), Some(1234));
        assert_eq!(parse_lsof_pid(""), None);
        assert_eq!(parse_lsof_pid("garbage\n"), None);
    }

    #[test]
    fn only_listening_sockets_on_the_port_are_returned() {
        assert_eq!(listening_inodes(TCP_TABLE, 8080), vec![4242]);
        assert_eq!(listening_inodes(TCP_TABLE, 22), vec![999]);
        assert!(listening_inodes(TCP_TABLE, 9090).is_empty());
    }

    #[test]
    fn socket_links_are_parsed() {
        assert_eq!(socket_inode("socket:[4242]"), Some(4242));
        assert_eq!(socket_inode("pipe:[4242]"), None);
        assert_eq!(socket_inode("/dev/null"), None);
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn procfs_finds_our_own_listener() {
        if !Path::new("/proc/net/tcp").exists() {
            return;
        }
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let pid = ProcfsResolver::default().listening_pid(port).await.unwrap();
        assert_eq!(pid, Some(std::process::id()));
    }

    #[tokio::test]
    async fn procfs_without_tables_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = ProcfsResolver::with_root(dir.path());

        assert!(matches!(
            resolver.listening_pid(8080).await,
            Err(HotReloadError::ProbeError { port: 8080, .. })
        ));
    }
}
