//! End-to-end run scenarios: resolve a selection, drive it, project rows.
//!
//! Tests cover:
//! - Derived dependencies are covered by their dependent's update
//! - Dependency chains collapse onto their head
//! - Failed dependency lookups do not block a run
//! - Unselected dependencies produce a confirmation warning
//! - Failures are logged without aborting the run
//! - Updates never overlap

#![cfg(test)]

use std::sync::Arc;
use std::time::Duration;

use hostupd::gateway::{GatewayError, TaskStatus};
use hostupd::gateway::mock::MockGateway;
use hostupd::logic::deps::{dependency_warning, resolve};
use hostupd::logic::orchestrator::{Orchestrator, RunEvent, RunOutcome};
use hostupd::logic::projector::RowStates;
use hostupd::state::{UpdateRun, UpdateStatus};
use tokio::sync::mpsc;

/// What: Turn string literals into owned names.
fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

/// What: Resolve `selected` and run it to the end without pacing.
///
/// Inputs:
/// - `gw`: Scripted gateway.
/// - `selected`: Selection in order.
///
/// Output:
/// - Finished run, its outcome and every emitted event.
async fn resolve_and_run(
    gw: &Arc<MockGateway>,
    selected: &[&str],
) -> (UpdateRun, RunOutcome, Vec<RunEvent>) {
    let candidates = hostupd::gateway::Gateway::list_software_updates(gw.as_ref())
        .await
        .expect("listing");
    let entries = resolve(gw.as_ref(), &names(selected), &candidates).await;
    let mut run = UpdateRun::new(entries);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let orch = Orchestrator::new(Arc::clone(gw), tx)
        .with_step_delay(Duration::ZERO)
        .with_poll_interval(Duration::ZERO);
    let outcome = orch.run(&mut run).await;
    drop(orch);
    let mut events = Vec::new();
    while let Some(ev) = rx.recv().await {
        events.push(ev);
    }
    (run, outcome, events)
}

/// What: Fold row events into the final row table.
fn rows_of(events: &[RunEvent]) -> RowStates {
    let mut rows = RowStates::new();
    for ev in events {
        if let RunEvent::Rows(batch) = ev {
            rows.apply(batch.clone());
        }
    }
    rows
}

#[tokio::test]
/// What: A selected dependency rides along with its dependent.
///
/// Inputs:
/// - Selection `[pkgA, pkgB]`, deps `pkgA -> [pkgB]`, `pkgB -> []`.
///
/// Output:
/// - `pkgB` derived with no unselected deps; only `pkgA` applied; both rows finished.
///
/// Details:
/// - `pkgB` keeps `Pending` as its own status; only its row shows the result.
async fn derived_dependency_is_covered_by_dependent() {
    let gw = Arc::new(
        MockGateway::new()
            .with_updates(&["pkgA", "pkgB"])
            .with_deps("pkgA", &["pkgB"])
            .with_deps("pkgB", &[]),
    );
    let (run, outcome, events) = resolve_and_run(&gw, &["pkgA", "pkgB"]).await;

    assert_eq!(outcome, RunOutcome::Completed);
    let b = run.entry("pkgB").expect("pkgB entry");
    assert!(b.is_dependency_of_selected);
    assert!(b.depends_not_selected.is_empty());
    assert_eq!(b.status, UpdateStatus::Pending);
    assert_eq!(gw.update_calls(), names(&["pkgA"]));

    let rows = rows_of(&events);
    assert_eq!(rows.get("pkgA").map(|r| r.status), Some(UpdateStatus::Finished));
    assert_eq!(rows.get("pkgB").map(|r| r.status), Some(UpdateStatus::Finished));
    assert!(!rows.is_selectable("pkgB"));
}

#[tokio::test]
/// What: Unselected dependencies are listed for confirmation.
///
/// Inputs:
/// - Selection `[pkgX]`, deps `pkgX -> [pkgY]`, `pkgY` listed but not selected.
///
/// Output:
/// - `depends_not_selected == [pkgY]`; warning text `pkgX: pkgY`.
async fn unselected_dependency_is_warned() {
    let gw = MockGateway::new()
        .with_updates(&["pkgX", "pkgY"])
        .with_deps("pkgX", &["pkgY"]);
    let candidates = hostupd::gateway::Gateway::list_software_updates(&gw)
        .await
        .expect("listing");
    let entries = resolve(&gw, &names(&["pkgX"]), &candidates).await;
    assert_eq!(entries[0].depends_not_selected, names(&["pkgY"]));
    assert_eq!(dependency_warning(&entries).as_deref(), Some("pkgX: pkgY"));
}

#[tokio::test]
/// What: A failed package is logged and the run goes on.
///
/// Inputs:
/// - Selection `[pkgX, pkgZ]`; `pkgX` fails with "disk full".
///
/// Output:
/// - `pkgX` failed, transcript holds `pkgX   disk full`, `pkgZ` finished.
/// - Controls are re-enabled exactly once, as the last control event.
async fn failure_is_logged_and_controls_return_at_end() {
    let gw = Arc::new(
        MockGateway::new()
            .with_updates(&["pkgX", "pkgZ"])
            .with_update_result("pkgX", TaskStatus::Failed, "disk full"),
    );
    let (run, outcome, events) = resolve_and_run(&gw, &["pkgX", "pkgZ"]).await;

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(run.entries[0].status, UpdateStatus::Failed);
    assert_eq!(run.entries[1].status, UpdateStatus::Finished);
    assert!(run.log_lines().iter().any(|l| l == "pkgX   disk full"));
    assert!(events.contains(&RunEvent::Progress("pkgX   disk full".into())));

    let controls: Vec<bool> = events
        .iter()
        .filter_map(|e| match e {
            RunEvent::ControlsEnabled(on) => Some(*on),
            _ => None,
        })
        .collect();
    assert_eq!(controls.last(), Some(&true));
    assert_eq!(controls.iter().filter(|on| **on).count(), 1);
    assert!(events.iter().any(|e| matches!(e, RunEvent::Listing(_))));
}

#[tokio::test]
/// What: Updates run strictly one after another in selection order.
///
/// Inputs:
/// - Five independent packages.
///
/// Output:
/// - Never more than one open update; calls in selection order.
async fn updates_never_overlap() {
    let selection = ["e", "b", "d", "a", "c"];
    let gw = Arc::new(MockGateway::new().with_updates(&selection));
    let (_run, outcome, _events) = resolve_and_run(&gw, &selection).await;
    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(gw.max_open_updates(), 1);
    assert_eq!(gw.update_calls(), names(&selection));
}

#[tokio::test]
/// What: Resolution is deterministic and the run applies only the uncovered entry.
///
/// Inputs:
/// - Selection `[c, a, b]` with `c -> [a]`, `b -> [c]`, resolved twice then run.
///
/// Output:
/// - Identical entries both times, ordered `c, a, b`.
/// - `c` and `a` derived, so only `b` is applied.
async fn resolution_is_repeatable() {
    let gw = Arc::new(
        MockGateway::new()
            .with_updates(&["a", "b", "c"])
            .with_deps("c", &["a"])
            .with_deps("b", &["c"]),
    );
    let candidates = hostupd::gateway::Gateway::list_software_updates(gw.as_ref())
        .await
        .expect("listing");
    let sel = names(&["c", "a", "b"]);
    let first = resolve(gw.as_ref(), &sel, &candidates).await;
    let second = resolve(gw.as_ref(), &sel, &candidates).await;
    assert_eq!(first, second);
    let order: Vec<&str> = first.iter().map(|e| e.package_name.as_str()).collect();
    assert_eq!(order, vec!["c", "a", "b"]);
    let derived: Vec<bool> = first.iter().map(|e| e.is_dependency_of_selected).collect();
    assert_eq!(derived, vec![true, true, false]);

    let (_run, outcome, _events) = resolve_and_run(&gw, &["c", "a", "b"]).await;
    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(gw.update_calls(), names(&["b"]));
}

#[tokio::test]
/// What: A dependency chain is applied through its head only.
///
/// Inputs:
/// - Selection `[c, a, b]` with `c -> [a]`, `a -> [b]`.
///
/// Output:
/// - Only `c` applied; `a` and `b` rows show its result.
async fn dependency_chain_applies_head_only() {
    let gw = Arc::new(
        MockGateway::new()
            .with_updates(&["a", "b", "c"])
            .with_deps("c", &["a"])
            .with_deps("a", &["b"]),
    );
    let (run, outcome, events) = resolve_and_run(&gw, &["c", "a", "b"]).await;

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(gw.update_calls(), names(&["c"]));
    assert!(run.entry("a").is_some_and(|e| e.is_dependency_of_selected));
    assert!(run.entry("b").is_some_and(|e| e.is_dependency_of_selected));
    let rows = rows_of(&events);
    for name in ["c", "a", "b"] {
        assert_eq!(rows.get(name).map(|r| r.status), Some(UpdateStatus::Finished));
    }
}

#[tokio::test]
/// What: A failed dependency lookup does not block the run.
///
/// Inputs:
/// - Selection `[x, y]`; `package_deps(x)` fails, `y -> [z]` with `z` listed.
///
/// Output:
/// - Both entries in order; `x` has no dependency data; both are applied.
async fn failed_dependency_lookup_counts_as_no_dependencies() {
    let gw = Arc::new(
        MockGateway::new()
            .with_updates(&["x", "y", "z"])
            .with_deps_error("x", GatewayError::RemoteUnavailable("timeout".into()))
            .with_deps("y", &["z"]),
    );
    let candidates = hostupd::gateway::Gateway::list_software_updates(gw.as_ref())
        .await
        .expect("listing");
    let entries = resolve(gw.as_ref(), &names(&["x", "y"]), &candidates).await;
    let order: Vec<&str> = entries.iter().map(|e| e.package_name.as_str()).collect();
    assert_eq!(order, vec!["x", "y"]);
    assert!(entries[0].dependencies.is_empty());
    assert!(entries[0].depends_not_selected.is_empty());
    assert_eq!(entries[1].depends_not_selected, names(&["z"]));

    let (run, outcome, _events) = resolve_and_run(&gw, &["x", "y"]).await;
    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(gw.update_calls(), names(&["x", "y"]));
    assert_eq!(run.entries[0].status, UpdateStatus::Finished);
}
