// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod port;
pub mod supervisor;
pub mod types;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{default_config_path, load_or_default, ConfigFile};
use crate::engine::{spawn_signal_listener, ShutdownFlag, SupervisorContext};
use crate::exec::ShellBackend;
use crate::fs::{FileSystem, RealFileSystem};
use crate::port::{resolver_for, PortProbe};
use crate::supervisor::{ManagedProcess, Supervisor};
use crate::watch::{ScanFilter, SnapshotScanner};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file, then CLI overrides)
/// - the snapshot scanner
/// - port probe + supervisor
/// - SIGINT / SIGTERM handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_config(&args)?;

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let root = fs
        .canonicalize(&cfg.watch.root)
        .with_context(|| format!("watch root {:?} is not accessible", cfg.watch.root))?;
    let filter = ScanFilter::from_config(&cfg.watch)?;
    let scanner = SnapshotScanner::new(fs, root, filter);

    if args.dry_run {
        print_dry_run(&cfg, &scanner);
        return Ok(());
    }

    let shutdown = ShutdownFlag::new();
    spawn_signal_listener(shutdown.clone());

    let probe = PortProbe::new(resolver_for(cfg.service.resolver), cfg.timing.probe_timeout);
    let process = ManagedProcess::new(cfg.service.cmd.clone(), cfg.service.port);
    let supervisor = Supervisor::new(
        ShellBackend::new(),
        probe,
        process,
        cfg.timing,
        shutdown.clone(),
    );

    let ctx = SupervisorContext::new(supervisor, scanner, cfg.watch.poll_interval, shutdown);
    ctx.run().await?;

    info!("hotreload stopped");
    Ok(())
}

/// Resolve the effective configuration.
///
/// An explicit `--config` must exist; the implicit `HotReload.toml` may be
/// absent, in which case built-in defaults apply.
pub fn load_config(args: &CliArgs) -> Result<ConfigFile> {
    let (path, required) = match &args.config {
        Some(p) => (PathBuf::from(p), true),
        None => (default_config_path(), false),
    };

    let mut raw = load_or_default(&path, required)
        .with_context(|| format!("loading config {:?}", path))?;
    args.apply_overrides(&mut raw);

    let cfg = ConfigFile::try_from(raw).with_context(|| format!("invalid config {:?}", path))?;
    debug!(?cfg, "effective configuration");
    Ok(cfg)
}

/// Print the effective settings and the initial snapshot size.
fn print_dry_run(cfg: &ConfigFile, scanner: &SnapshotScanner) {
    println!("hotreload dry-run");
    println!("  service.cmd = {}", cfg.service.cmd);
    println!("  service.port = {}", cfg.service.port);
    println!("  service.resolver = {:?}", cfg.service.resolver);
    println!("  watch.root = {}", scanner.root().display());
    println!("  watch.extensions = {:?}", scanner.filter().extensions());
    if !cfg.watch.exclude.is_empty() {
        println!("  watch.exclude = {:?}", cfg.watch.exclude);
    }
    println!("  watch.poll_interval = {:?}", cfg.watch.poll_interval);
    println!(
        "  timing.port_wait = {} x {:?}",
        cfg.timing.port_wait_attempts, cfg.timing.port_wait_interval
    );
    println!(
        "  timing.graceful_wait = {} x {:?}",
        cfg.timing.graceful_wait_attempts, cfg.timing.graceful_wait_interval
    );
    println!("  timing.probe_timeout = {:?}", cfg.timing.probe_timeout);
    println!();

    let snapshot = scanner.scan();
    println!("tracked files: {}", snapshot.len());

    debug!("dry-run complete (nothing started)");
}
