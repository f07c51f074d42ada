//! Sequential, dependency-aware update runs.
//!
//! A run walks its entries with a single cursor. Each [`Orchestrator::step`]
//! either skips a derived entry, applies one package update and waits for the
//! remote task to end, or completes the run. Only one update is ever in
//! flight. Front ends observe the run through [`RunEvent`]s.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;

use crate::gateway::task::follow_task;
use crate::gateway::{Gateway, GatewayError, Task, TaskStatus};
use crate::logic::projector::{RowDisplay, project};
use crate::state::{UpdateCandidate, UpdateRun, UpdateStatus};

/// Note appended to the transcript when a whole-system update finishes.
pub const UPDATE_ALL_FINISHED: &str = "Update finished.";

/// What: Notifications emitted while a run progresses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunEvent {
    /// Global apply controls enabled (`true`) or disabled (`false`).
    ControlsEnabled(bool),
    /// Row displays to apply.
    Rows(Vec<RowDisplay>),
    /// Text appended to the progress transcript.
    Progress(String),
    /// Global error notification.
    Error(String),
    /// Fresh candidate listing after the run.
    Listing(Vec<UpdateCandidate>),
    /// Listing refresh failed; carries the empty-state message.
    ListingFailed(String),
}

/// How a run ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every entry was processed.
    Completed,
    /// A remote call failed at `cursor`; earlier entries keep their status.
    Halted {
        /// Entry that could not be applied.
        cursor: usize,
        /// The failure.
        error: GatewayError,
    },
    /// Cancellation was requested before the entry at `cursor` was dispatched.
    Cancelled {
        /// First entry not processed.
        cursor: usize,
    },
}

/// Result of a single step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Cursor advanced; more work may follow.
    Advanced,
    /// The run ended.
    Finished(RunOutcome),
}

/// Drives update runs against a gateway.
#[derive(Debug)]
pub struct Orchestrator<G> {
    gateway: Arc<G>,
    step_delay: Duration,
    poll_interval: Duration,
    cancel: Arc<AtomicBool>,
    events: mpsc::UnboundedSender<RunEvent>,
}

/// What: Map a terminal task status onto the entry status.
const fn entry_status(status: TaskStatus) -> UpdateStatus {
    match status {
        TaskStatus::Running => UpdateStatus::Running,
        TaskStatus::Finished => UpdateStatus::Finished,
        TaskStatus::Failed => UpdateStatus::Failed,
    }
}

impl<G: Gateway> Orchestrator<G> {
    /// What: Create an orchestrator with one-second pacing and polling.
    ///
    /// Inputs:
    /// - `gateway`: Remote used for updates and the final re-list.
    /// - `events`: Channel receiving [`RunEvent`]s.
    pub fn new(gateway: Arc<G>, events: mpsc::UnboundedSender<RunEvent>) -> Self {
        Self {
            gateway,
            step_delay: Duration::from_secs(1),
            poll_interval: Duration::from_secs(1),
            cancel: Arc::new(AtomicBool::new(false)),
            events,
        }
    }

    /// Pause between steps; zero disables pacing.
    #[must_use]
    pub const fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    /// Interval between remote task polls.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Use an externally owned cancellation flag.
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = flag;
        self
    }

    /// Flag that, once set, stops the run before its next dispatch.
    #[must_use]
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Send an event; a closed receiver only means nobody is watching.
    fn emit(&self, event: RunEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("run event dropped: receiver closed");
        }
    }

    /// Emit row displays for one entry when there is something to show.
    fn emit_rows(&self, run: &UpdateRun, index: usize) {
        let rows = project(run, index);
        if !rows.is_empty() {
            self.emit(RunEvent::Rows(rows));
        }
    }

    /// What: Drive `run` to the end.
    ///
    /// Inputs:
    /// - `run`: Resolved selection; mutated in place.
    ///
    /// Output:
    /// - How the run ended.
    ///
    /// Details:
    /// - Steps strictly one after another, sleeping the step delay between them.
    pub async fn run(&self, run: &mut UpdateRun) -> RunOutcome {
        tracing::info!(
            entries = run.entries.len(),
            applied = run.applied_names().len(),
            "update run started"
        );
        loop {
            match self.step(run).await {
                Step::Advanced => {
                    if !self.step_delay.is_zero() {
                        tokio::time::sleep(self.step_delay).await;
                    }
                }
                Step::Finished(outcome) => {
                    tracing::info!(outcome = ?outcome, "update run ended");
                    return outcome;
                }
            }
        }
    }

    /// What: Process the entry under the cursor.
    ///
    /// Inputs:
    /// - `run`: Active run.
    ///
    /// Output:
    /// - `Advanced` after a skipped or applied entry, `Finished` at the end.
    ///
    /// Details:
    /// - Cancellation is checked first, before anything is dispatched.
    /// - Derived entries are not applied and stay pending.
    /// - A gateway error halts the run at the current entry without advancing.
    pub async fn step(&self, run: &mut UpdateRun) -> Step {
        if self.cancel.load(Ordering::SeqCst) {
            tracing::info!(cursor = run.cursor, "update run cancelled");
            return Step::Finished(RunOutcome::Cancelled { cursor: run.cursor });
        }
        if run.is_complete() {
            self.complete().await;
            return Step::Finished(RunOutcome::Completed);
        }

        let index = run.cursor;
        let name = run.entries[index].package_name.clone();
        if run.entries[index].is_dependency_of_selected {
            tracing::debug!(package = %name, "skipping package covered by a selected dependent");
            self.emit_rows(run, index);
            run.cursor += 1;
            return Step::Advanced;
        }

        run.entries[index].advance_to(UpdateStatus::Running);
        self.emit(RunEvent::ControlsEnabled(false));
        self.emit_rows(run, index);

        match self.apply(&name).await {
            Ok(task) => {
                let status = entry_status(task.status);
                run.entries[index].advance_to(status);
                if status == UpdateStatus::Failed {
                    let line = format!("{name}   {}", task.message.trim_end());
                    tracing::warn!(package = %name, message = %task.message.trim_end(), "update failed");
                    run.log(line.clone());
                    self.emit(RunEvent::Progress(line));
                } else {
                    tracing::info!(package = %name, status = %status, "update step done");
                }
                self.emit_rows(run, index);
                run.cursor += 1;
                Step::Advanced
            }
            Err(error) => {
                tracing::error!(package = %name, error = %error, "update request failed; run halted");
                self.emit(RunEvent::Error(error.user_message().to_string()));
                Step::Finished(RunOutcome::Halted {
                    cursor: index,
                    error,
                })
            }
        }
    }

    /// What: Apply one package update and wait for its task to end.
    ///
    /// # Errors
    /// - Returns the gateway error of the start request or of any poll.
    async fn apply(&self, name: &str) -> Result<Task, GatewayError> {
        let task = self.gateway.update_software(name).await?;
        follow_task(self.gateway.as_ref(), task, self.poll_interval, |t| {
            tracing::trace!(package = %name, task = %t.id, "update still running");
        })
        .await
    }

    /// Re-enable controls and refresh the listing.
    async fn complete(&self) {
        self.emit(RunEvent::ControlsEnabled(true));
        self.refresh_listing().await;
    }

    /// What: Re-list candidates and announce the result.
    async fn refresh_listing(&self) {
        match self.gateway.list_software_updates().await {
            Ok(candidates) => {
                tracing::debug!(count = candidates.len(), "listing refreshed");
                self.emit(RunEvent::Listing(candidates));
            }
            Err(e) => {
                tracing::warn!(error = %e, "listing refresh failed");
                self.emit(RunEvent::ListingFailed(e.user_message().to_string()));
            }
        }
    }

    /// What: Update every package on the host through one remote task.
    ///
    /// Inputs:
    /// - `transcript`: Progress transcript to append the task output to.
    ///
    /// Output:
    /// - The final task, or the failing gateway error.
    ///
    /// # Errors
    /// - Returns the gateway error when the update cannot be started or followed.
    pub async fn update_all(&self, transcript: &mut Vec<String>) -> Result<Task, GatewayError> {
        match self.gateway.update_all_software().await {
            Ok(task) => {
                tracing::info!(task = %task.id, "system update started");
                self.attach(task, transcript).await
            }
            Err(e) => {
                tracing::error!(error = %e, "system update request failed");
                self.emit(RunEvent::Error(e.user_message().to_string()));
                Err(e)
            }
        }
    }

    /// What: Follow an already running system-update task to its end.
    ///
    /// Inputs:
    /// - `task`: Task as last seen, e.g. found again after a restart.
    /// - `transcript`: Progress transcript to append the task output to.
    ///
    /// Output:
    /// - The final task, or the failing gateway error.
    ///
    /// # Errors
    /// - Returns the gateway error of the first failed poll.
    ///
    /// Details:
    /// - Task messages are cumulative, so only the newly added part is emitted.
    /// - Controls are disabled for the duration and re-enabled afterwards, also on error.
    /// - The listing is refreshed once the task finishes successfully.
    pub async fn attach(&self, task: Task, transcript: &mut Vec<String>) -> Result<Task, GatewayError> {
        self.emit(RunEvent::ControlsEnabled(false));
        let result = self.stream_task(task, transcript).await;
        match &result {
            Ok(done) if done.status == TaskStatus::Finished => {
                transcript.push(UPDATE_ALL_FINISHED.to_string());
                self.emit(RunEvent::Progress(UPDATE_ALL_FINISHED.to_string()));
                self.refresh_listing().await;
            }
            Ok(done) => {
                tracing::warn!(task = %done.id, "system update failed");
            }
            Err(e) => {
                tracing::error!(error = %e, "lost track of system update");
                self.emit(RunEvent::Error(e.user_message().to_string()));
            }
        }
        self.emit(RunEvent::ControlsEnabled(true));
        result
    }

    /// Poll `task` and stream the new part of its output.
    async fn stream_task(&self, task: Task, transcript: &mut Vec<String>) -> Result<Task, GatewayError> {
        let mut last = String::new();
        let mut stream = |t: &Task| {
            let fresh = fresh_output(&last, &t.message);
            if !fresh.is_empty() {
                transcript.push(fresh.to_string());
                self.emit(RunEvent::Progress(fresh.to_string()));
            }
            last.clone_from(&t.message);
        };
        let done = follow_task(self.gateway.as_ref(), task, self.poll_interval, &mut stream).await?;
        stream(&done);
        Ok(done)
    }
}

/// What: Part of a task message not streamed yet.
///
/// Inputs:
/// - `previous`: Message as of the last poll.
/// - `current`: Message as of this poll.
///
/// Output:
/// - The appended suffix when `current` extends `previous`, otherwise all of `current`.
fn fresh_output<'a>(previous: &str, current: &'a str) -> &'a str {
    current.strip_prefix(previous).unwrap_or(current)
}
