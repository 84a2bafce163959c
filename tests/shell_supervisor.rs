// tests/shell_supervisor.rs
//
// Real child processes driven through `sh -c`.
#![cfg(unix)]

mod common;

use std::error::Error;
use std::sync::Arc;

use hotreload::engine::ShutdownFlag;
use hotreload::exec::ShellBackend;
use hotreload::supervisor::{StartOutcome, SupervisorState};

use crate::common::builders::{free_port, supervisor_with};
use crate::common::{init_tracing, with_timeout, StaticResolver};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn restart_replaces_a_real_process() -> TestResult {
    init_tracing();
    let mut sup = supervisor_with(
        ShellBackend::new(),
        Arc::new(StaticResolver::default()),
        "sleep 30",
        free_port(),
        ShutdownFlag::new(),
    );

    let StartOutcome::Started(first) = with_timeout(sup.start()).await? else {
        panic!("initial start failed");
    };
    let StartOutcome::Started(second) = with_timeout(sup.restart()).await? else {
        panic!("restart failed");
    };
    assert_ne!(first, second);

    let report = with_timeout(sup.shutdown()).await?.ok_or("nothing was stopped")?;
    assert_eq!(report.pid, second);
    assert_eq!(report.signal, Some(15));
    assert_eq!(sup.state(), SupervisorState::Terminated);

    Ok(())
}

#[tokio::test]
async fn process_ignoring_sigterm_is_killed() -> TestResult {
    init_tracing();
    let mut sup = supervisor_with(
        ShellBackend::new(),
        Arc::new(StaticResolver::default()),
        "trap '' TERM; sleep 30",
        free_port(),
        ShutdownFlag::new(),
    );

    with_timeout(sup.start()).await?;
    // Let the shell install its trap before we signal it.
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;
    let report = with_timeout(sup.stop()).await?.ok_or("nothing was stopped")?;

    assert_eq!(report.signal, Some(9));
    assert_eq!(sup.pid(), None);

    Ok(())
}

#[tokio::test]
async fn crashing_command_is_noticed() -> TestResult {
    init_tracing();
    let mut sup = supervisor_with(
        ShellBackend::new(),
        Arc::new(StaticResolver::default()),
        "exit 7",
        free_port(),
        ShutdownFlag::new(),
    );

    let StartOutcome::Started(pid) = with_timeout(sup.start()).await? else {
        panic!("start failed");
    };

    let report = with_timeout(async {
        loop {
            if let Some(report) = sup.poll_exit()? {
                return Ok::<_, hotreload::errors::HotReloadError>(report);
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    })
    .await?;

    assert_eq!(report.pid, pid);
    assert_eq!(report.code, Some(7));
    assert_eq!(sup.state(), SupervisorState::Stopped);

    Ok(())
}
