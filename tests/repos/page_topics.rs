//! Repository topics drive re-listing on the page.
//!
//! Tests cover:
//! - Toggle publishes an update topic and the listener re-lists
//! - Teardown stops the listener

#![cfg(test)]

use std::sync::Arc;
use std::time::Duration;

use hostupd::app::HostUpdatePage;
use hostupd::config::Settings;
use hostupd::gateway::mock::MockGateway;
use hostupd::gateway::{Capabilities, NewRepository, RepoTool, Repository};
use hostupd::logic::repos::RepoListing;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// What: Repository fixture.
fn repo(id: &str, enabled: bool) -> Repository {
    Repository {
        repo_id: id.to_string(),
        enabled,
        baseurl: format!("http://mirror.example/{id}"),
        config: serde_json::Map::new(),
    }
}

/// What: Open a yum page with `repos` configured.
async fn open_with(
    repos: Vec<Repository>,
) -> (HostUpdatePage<MockGateway>, Arc<MockGateway>) {
    let gw = Arc::new(
        MockGateway::new()
            .with_capabilities(Capabilities {
                update_tool: true,
                repo_tool: RepoTool::Yum,
            })
            .with_repositories(repos),
    );
    let (tx, _rx) = mpsc::unbounded_channel();
    let page = HostUpdatePage::open(Arc::clone(&gw), &Settings::default(), tx).await;
    (page, gw)
}

#[tokio::test]
/// What: A toggle leads to a fresh listing through the topic listener.
///
/// Inputs:
/// - Repository `epel` enabled; page subscribed; `epel` toggled.
///
/// Output:
/// - The listener delivers a listing where `epel` is disabled.
async fn toggle_triggers_relist() {
    let (mut page, gw) = open_with(vec![repo("epel", true)]).await;
    assert!(page.sections().repositories);
    let (tx, mut listings) = mpsc::unbounded_channel();
    page.subscribe_repository_topics(tx);

    let outcome = page.repositories().toggle(&gw.repositories()).await;
    assert_eq!(outcome.succeeded, vec!["epel".to_string()]);

    let listing = timeout(Duration::from_secs(5), listings.recv())
        .await
        .expect("listing in time")
        .expect("listener alive");
    match listing {
        RepoListing::Rows(rows) => assert!(!rows[0].enabled),
        RepoListing::Empty(msg) => panic!("unexpected empty state: {msg}"),
    }
    page.teardown();
}

#[tokio::test]
/// What: Adding a repository is announced, and teardown stops listening.
///
/// Inputs:
/// - Empty repository list; `updates` added; page torn down.
///
/// Output:
/// - One listing containing `updates`; afterwards the listing channel closes.
async fn add_announces_and_teardown_stops_listener() {
    let (mut page, _gw) = open_with(Vec::new()).await;
    let (tx, mut listings) = mpsc::unbounded_channel();
    page.subscribe_repository_topics(tx);

    page.repositories()
        .add(&NewRepository {
            repo_id: "updates".into(),
            baseurl: "http://mirror.example/updates".into(),
            config: serde_json::Map::new(),
        })
        .await
        .expect("added");
    let listing = timeout(Duration::from_secs(5), listings.recv())
        .await
        .expect("listing in time");
    assert!(matches!(listing, Some(RepoListing::Rows(ref rows)) if rows.len() == 1));

    page.teardown();
    let closed = timeout(Duration::from_secs(5), listings.recv())
        .await
        .expect("closed in time");
    assert!(closed.is_none());
}
