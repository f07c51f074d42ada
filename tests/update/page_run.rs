//! Page-level run handling: locking, preparation, system update and resume.
//!
//! Tests cover:
//! - A halted run keeps the page locked until discarded
//! - Preparation filters unlisted names
//! - Capability gating
//! - Resuming a running system update

#![cfg(test)]

use std::sync::Arc;

use hostupd::app::{HostUpdatePage, Resume, RunError};
use hostupd::config::Settings;
use hostupd::gateway::mock::MockGateway;
use hostupd::gateway::{Capabilities, GatewayError, RepoTool, Task, TaskStatus};
use hostupd::logic::orchestrator::{RunEvent, RunOutcome, UPDATE_ALL_FINISHED};
use tokio::sync::mpsc;

/// What: Settings without pacing or poll delays.
fn fast_settings() -> Settings {
    Settings {
        step_delay_ms: 0,
        task_poll_interval_ms: 0,
        ..Settings::default()
    }
}

/// What: Capabilities with updates and yum repositories.
const fn full_caps() -> Capabilities {
    Capabilities {
        update_tool: true,
        repo_tool: RepoTool::Yum,
    }
}

/// What: Open a page on `gw` and return it with its event receiver.
async fn open(
    gw: MockGateway,
) -> (
    HostUpdatePage<MockGateway>,
    Arc<MockGateway>,
    mpsc::UnboundedReceiver<RunEvent>,
) {
    let gw = Arc::new(gw);
    let (tx, rx) = mpsc::unbounded_channel();
    let page = HostUpdatePage::open(Arc::clone(&gw), &fast_settings(), tx).await;
    (page, gw, rx)
}

#[tokio::test]
/// What: A halted run blocks new runs until it is discarded.
///
/// Inputs:
/// - Selection `[a, b]`; starting `b` fails with a transport error.
///
/// Output:
/// - First run halts at `b`; a second start is `AlreadyRunning`; after discard a
///   new run starts and completes.
async fn halted_run_locks_page_until_discarded() {
    let (page, _gw, mut rx) = open(
        MockGateway::new()
            .with_capabilities(full_caps())
            .with_updates(&["a", "b"])
            .with_update_error("b", GatewayError::RemoteUnavailable("timeout".into())),
    )
    .await;

    let mut run = page
        .prepare_run(&["a".to_string(), "b".to_string()])
        .await
        .expect("prepared")
        .run;
    let outcome = page.start_run(&mut run).await.expect("started");
    assert!(matches!(outcome, RunOutcome::Halted { cursor: 1, .. }));
    assert!(page.is_running());

    let mut again = page
        .prepare_run(&["a".to_string()])
        .await
        .expect("prepared")
        .run;
    assert_eq!(
        page.start_run(&mut again).await,
        Err(RunError::AlreadyRunning)
    );

    page.discard_run();
    assert!(!page.is_running());
    let mut controls_back = false;
    while let Ok(ev) = rx.try_recv() {
        controls_back = ev == RunEvent::ControlsEnabled(true);
    }
    assert!(controls_back);

    assert_eq!(
        page.start_run(&mut again).await,
        Ok(RunOutcome::Completed)
    );
    assert!(!page.is_running());
}

#[tokio::test]
/// What: Names without a listed update are dropped before resolving.
///
/// Inputs:
/// - Listing `[vim]`; selection `[vim, ghost]`, then `[ghost]`.
///
/// Output:
/// - Run over `vim` with `ghost` reported unknown; then `NothingSelected`.
async fn prepare_drops_unlisted_names() {
    let (page, _gw, _rx) = open(
        MockGateway::new()
            .with_capabilities(full_caps())
            .with_updates(&["vim"]),
    )
    .await;
    let prepared = page
        .prepare_run(&["vim".to_string(), "ghost".to_string()])
        .await
        .expect("prepared");
    assert_eq!(prepared.run.entries.len(), 1);
    assert_eq!(prepared.unknown, vec!["ghost".to_string()]);
    assert!(prepared.warning.is_none());

    let err = page
        .prepare_run(&["ghost".to_string()])
        .await
        .expect_err("nothing listed");
    assert_eq!(err, RunError::NothingSelected);
}

#[tokio::test]
/// What: Hosts without an update tool refuse update actions.
///
/// Inputs:
/// - Capabilities unavailable (mock returns an error).
///
/// Output:
/// - Sections hidden; `prepare_run` and `update_all` report `UpdatesUnavailable`.
async fn missing_update_tool_is_refused() {
    let (page, gw, _rx) = open(MockGateway::new().with_updates(&["vim"])).await;
    assert!(!page.sections().updates);
    assert!(!page.sections().repositories);
    assert_eq!(
        page.prepare_run(&["vim".to_string()]).await.expect_err("refused"),
        RunError::UpdatesUnavailable
    );
    let mut transcript = Vec::new();
    assert_eq!(
        page.update_all(&mut transcript).await.expect_err("refused"),
        RunError::UpdatesUnavailable
    );
    assert!(gw.update_calls().is_empty());
}

#[tokio::test]
/// What: Resume follows a running system update to its end.
///
/// Inputs:
/// - Running `swupdate` task that finishes with more output.
///
/// Output:
/// - `Attached` with the finished task; transcript holds the new output and the
///   completion note; the page is free afterwards.
async fn resume_follows_running_system_update() {
    let snap = |status, message: &str| Task {
        id: "swupdate".into(),
        status,
        message: message.into(),
        target_uri: "/plugins/gingerbase/host/swupdate".into(),
    };
    let (page, _gw, _rx) = open(
        MockGateway::new()
            .with_capabilities(full_caps())
            .with_task_script(vec![
                snap(TaskStatus::Running, "Downloading\n"),
                snap(TaskStatus::Finished, "Downloading\nInstalled 3 packages\n"),
            ]),
    )
    .await;

    let mut transcript = Vec::new();
    match page.resume(&mut transcript).await.expect("resumed") {
        Resume::Attached(task) => assert_eq!(task.status, TaskStatus::Finished),
        Resume::Fresh(_) => panic!("expected to attach"),
    }
    assert_eq!(
        transcript,
        vec![
            "Downloading\n".to_string(),
            "Installed 3 packages\n".to_string(),
            UPDATE_ALL_FINISHED.to_string(),
        ]
    );
    assert!(!page.is_running());
}
