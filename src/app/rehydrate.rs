//! Resuming a system update that was started before the client (re)connected.

use crate::gateway::task::running_swupdate_filter;
use crate::gateway::{Gateway, GatewayError, Task, TaskStatus};
use crate::state::UpdateCandidate;

/// Where the page starts after connecting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resume {
    /// A system update is still running on the host; follow it.
    Attached(Task),
    /// Nothing running; the current candidate listing.
    Fresh(Vec<UpdateCandidate>),
}

/// What: Look for a running system-update task, otherwise list updates.
///
/// Inputs:
/// - `gateway`: Remote to query.
///
/// Output:
/// - `Attached` with the first running update task (lowest id), else `Fresh`.
///
/// # Errors
/// - Returns the gateway error of the task query or of the listing.
pub async fn rehydrate<G>(gateway: &G) -> Result<Resume, GatewayError>
where
    G: Gateway + ?Sized,
{
    let running = gateway.tasks_by_filter(&running_swupdate_filter()).await?;
    if let Some(task) = running
        .into_iter()
        .find(|t| t.status == TaskStatus::Running)
    {
        tracing::info!(task = %task.id, "reattaching to running system update");
        return Ok(Resume::Attached(task));
    }
    let listing = gateway.list_software_updates().await?;
    tracing::debug!(count = listing.len(), "no running update; listing fresh");
    Ok(Resume::Fresh(listing))
}
