//! Page controller tying the update and repository sections together.
//!
//! Owns the capability flags, the run-level lock, the cancellation flag and
//! the background listeners. Front ends talk to the page; the page talks to
//! the logic modules.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use super::error::RunError;
use super::rehydrate::{Resume, rehydrate};
use crate::config::Settings;
use crate::gateway::{Capabilities, Gateway, GatewayError, Task};
use crate::logic::deps::{dependency_warning, resolve};
use crate::logic::orchestrator::{Orchestrator, RunEvent, RunOutcome};
use crate::logic::repos::{RepoListing, RepositoryController};
use crate::state::{TopicBus, UpdateRun};

/// Sections shown for the host's capabilities.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sections {
    /// Update listing and apply controls.
    pub updates: bool,
    /// Repository grid.
    pub repositories: bool,
}

/// A resolved selection waiting for confirmation.
#[derive(Clone, Debug)]
pub struct PreparedRun {
    /// Run to start once confirmed.
    pub run: UpdateRun,
    /// Unselected dependencies to confirm, one `pkg: dep, dep` line per package.
    pub warning: Option<String>,
    /// Selected names without a listed update; dropped from the run.
    pub unknown: Vec<String>,
}

/// Host update page bound to one gateway.
#[derive(Debug)]
pub struct HostUpdatePage<G> {
    gateway: Arc<G>,
    capabilities: Capabilities,
    topics: TopicBus,
    repos: RepositoryController<G>,
    events: mpsc::UnboundedSender<RunEvent>,
    step_delay: Duration,
    poll_interval: Duration,
    active: AtomicBool,
    cancel: Arc<AtomicBool>,
    listeners: Vec<JoinHandle<()>>,
}

impl<G> HostUpdatePage<G>
where
    G: Gateway + 'static,
{
    /// What: Open the page and load the host's capabilities.
    ///
    /// Inputs:
    /// - `gateway`: Remote for every call the page makes.
    /// - `settings`: Pacing and polling intervals.
    /// - `events`: Receiver side gets run progress.
    ///
    /// Output:
    /// - The page; capabilities fall back to "nothing available" when they cannot be read.
    pub async fn open(
        gateway: Arc<G>,
        settings: &Settings,
        events: mpsc::UnboundedSender<RunEvent>,
    ) -> Self {
        let capabilities = match gateway.capabilities().await {
            Ok(caps) => caps,
            Err(e) => {
                tracing::warn!(error = %e, "capabilities unavailable; hiding all sections");
                Capabilities::default()
            }
        };
        tracing::info!(
            update_tool = capabilities.update_tool,
            repo_tool = capabilities.repo_tool.as_str(),
            "page opened"
        );
        let topics = TopicBus::default();
        Self {
            repos: RepositoryController::new(Arc::clone(&gateway), topics.clone()),
            gateway,
            capabilities,
            topics,
            events,
            step_delay: settings.step_delay(),
            poll_interval: settings.poll_interval(),
            active: AtomicBool::new(false),
            cancel: Arc::new(AtomicBool::new(false)),
            listeners: Vec::new(),
        }
    }

    /// Capability flags loaded at open.
    #[must_use]
    pub const fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Sections to show.
    #[must_use]
    pub fn sections(&self) -> Sections {
        Sections {
            updates: self.capabilities.update_tool,
            repositories: self.capabilities.has_repositories(),
        }
    }

    /// Repository controller of this page.
    #[must_use]
    pub const fn repositories(&self) -> &RepositoryController<G> {
        &self.repos
    }

    /// Topic bus of this page.
    #[must_use]
    pub const fn topics(&self) -> &TopicBus {
        &self.topics
    }

    /// `true` while a run or system update holds the page.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// What: Re-list repositories whenever a repository topic is published.
    ///
    /// Inputs:
    /// - `listings`: Receives a fresh listing after every topic.
    ///
    /// Details:
    /// - The listener runs until [`Self::teardown`] or until `listings` is closed.
    /// - A lagging listener re-lists once for all missed topics.
    pub fn subscribe_repository_topics(&mut self, listings: mpsc::UnboundedSender<RepoListing>) {
        let mut rx = self.topics.subscribe();
        let ctl = RepositoryController::new(Arc::clone(&self.gateway), self.topics.clone());
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(topic) => tracing::debug!(topic = topic.name(), "re-listing repositories"),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::debug!(missed, "topic listener lagged; re-listing once");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
                if listings.send(ctl.list().await).is_err() {
                    break;
                }
            }
            tracing::debug!("repository topic listener stopped");
        });
        self.listeners.push(handle);
    }

    /// What: List candidates and resolve `selected` into a run.
    ///
    /// Inputs:
    /// - `selected`: Package names in selection order.
    ///
    /// Output:
    /// - The pending run plus the confirmation warning for unselected dependencies.
    ///
    /// # Errors
    /// - `UpdatesUnavailable` without an update tool.
    /// - `Gateway` when the listing fails.
    /// - `NothingSelected` when no selected name is listed.
    pub async fn prepare_run(&self, selected: &[String]) -> Result<PreparedRun, RunError> {
        if !self.capabilities.update_tool {
            return Err(RunError::UpdatesUnavailable);
        }
        let candidates = self.gateway.list_software_updates().await?;
        let listed: HashSet<&str> = candidates.iter().map(|c| c.package_name.as_str()).collect();
        let (known, unknown): (Vec<String>, Vec<String>) = selected
            .iter()
            .cloned()
            .partition(|name| listed.contains(name.as_str()));
        if !unknown.is_empty() {
            tracing::warn!(unknown = ?unknown, "selected packages without a listed update");
        }
        if known.is_empty() {
            return Err(RunError::NothingSelected);
        }
        let entries = resolve(self.gateway.as_ref(), &known, &candidates).await;
        let warning = dependency_warning(&entries);
        Ok(PreparedRun {
            run: UpdateRun::new(entries),
            warning,
            unknown,
        })
    }

    /// Take the run lock or report that one is held.
    fn acquire(&self) -> Result<(), RunError> {
        self.active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(|_| RunError::AlreadyRunning)
    }

    /// Build an orchestrator sharing the page's cancellation flag.
    fn orchestrator(&self) -> Orchestrator<G> {
        Orchestrator::new(Arc::clone(&self.gateway), self.events.clone())
            .with_step_delay(self.step_delay)
            .with_poll_interval(self.poll_interval)
            .with_cancel_flag(Arc::clone(&self.cancel))
    }

    /// What: Drive a prepared run to its end.
    ///
    /// Inputs:
    /// - `run`: Run from [`Self::prepare_run`]; its transcript starts empty.
    ///
    /// Output:
    /// - How the run ended.
    ///
    /// # Errors
    /// - `AlreadyRunning` when another run holds the page.
    ///
    /// Details:
    /// - Completed and cancelled runs release the page.
    /// - A halted run keeps the page locked until [`Self::discard_run`].
    pub async fn start_run(&self, run: &mut UpdateRun) -> Result<RunOutcome, RunError> {
        self.acquire()?;
        self.cancel.store(false, Ordering::SeqCst);
        let outcome = self.orchestrator().run(run).await;
        match &outcome {
            RunOutcome::Completed => self.active.store(false, Ordering::SeqCst),
            RunOutcome::Cancelled { .. } => self.discard_run(),
            RunOutcome::Halted { cursor, .. } => {
                tracing::warn!(cursor, "run halted; controls stay disabled until discarded");
            }
        }
        Ok(outcome)
    }

    /// What: Release the page after a halted or cancelled run.
    pub fn discard_run(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            tracing::info!("update run discarded");
            if self.events.send(RunEvent::ControlsEnabled(true)).is_err() {
                tracing::trace!("run event dropped: receiver closed");
            }
        }
    }

    /// Ask the active run to stop before its next step.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// What: Update every package through one system-update task.
    ///
    /// Inputs:
    /// - `transcript`: Receives the task output.
    ///
    /// # Errors
    /// - `AlreadyRunning` when a run holds the page; `Gateway` when the task fails to start or poll.
    pub async fn update_all(&self, transcript: &mut Vec<String>) -> Result<Task, RunError> {
        if !self.capabilities.update_tool {
            return Err(RunError::UpdatesUnavailable);
        }
        self.acquire()?;
        let result = self.orchestrator().update_all(transcript).await;
        self.active.store(false, Ordering::SeqCst);
        result.map_err(RunError::from)
    }

    /// What: Reattach to a running system update, or list updates.
    ///
    /// Inputs:
    /// - `transcript`: Receives the output of a reattached task.
    ///
    /// Output:
    /// - `Attached` with the final task after following it, or `Fresh` with the listing.
    ///
    /// # Errors
    /// - `AlreadyRunning` when a run holds the page; `Gateway` on remote failures.
    pub async fn resume(&self, transcript: &mut Vec<String>) -> Result<Resume, RunError> {
        if !self.capabilities.update_tool {
            return Err(RunError::UpdatesUnavailable);
        }
        match rehydrate(self.gateway.as_ref()).await? {
            Resume::Attached(task) => {
                self.acquire()?;
                let result = self.orchestrator().attach(task, transcript).await;
                self.active.store(false, Ordering::SeqCst);
                result.map(Resume::Attached).map_err(RunError::from)
            }
            fresh @ Resume::Fresh(_) => Ok(fresh),
        }
    }

    /// What: Stop listeners and any active run.
    ///
    /// Details:
    /// - Safe to call more than once.
    pub fn teardown(&mut self) {
        self.cancel.store(true, Ordering::SeqCst);
        let n = self.listeners.len();
        for handle in self.listeners.drain(..) {
            handle.abort();
        }
        if n > 0 {
            tracing::debug!(listeners = n, "page torn down");
        }
    }
}

impl<G> Drop for HostUpdatePage<G> {
    fn drop(&mut self) {
        for handle in self.listeners.drain(..) {
            handle.abort();
        }
    }
}

/// Convert a gateway error into the text shown for an empty update listing.
#[must_use]
pub fn listing_error_text(error: &GatewayError) -> String {
    let reason = error.user_message().trim();
    if reason.is_empty() {
        "Unable to list software updates.".to_string()
    } else {
        reason.to_string()
    }
}
