//! Asynchronous remote tasks and polling.

use std::time::Duration;

use serde::Deserialize;

use super::{Gateway, GatewayError};

/// Target URI pattern of software-update tasks on the panel.
pub const SWUPDATE_TARGET_URI: &str = "^/plugins/gingerbase/host/swupdate/*";

/// Lifecycle state of a remote task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Still executing.
    Running,
    /// Completed successfully.
    Finished,
    /// Completed with an error.
    Failed,
}

/// A background task as reported by `tasks/{id}`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Task {
    /// Task identifier.
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    /// Current status.
    pub status: TaskStatus,
    /// Accumulated output or error message.
    #[serde(default)]
    pub message: String,
    /// URI of the resource the task operates on.
    #[serde(default)]
    pub target_uri: String,
}

/// What: Accept task ids encoded either as JSON strings or numbers.
fn id_as_string<'de, D>(de: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(de)?;
    match v {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "task id must be a string or number, got {other}"
        ))),
    }
}

/// What: Build the task filter query used to find running software updates.
///
/// Output:
/// - `status=running&target_uri=<percent-encoded pattern>`
#[must_use]
pub fn running_swupdate_filter() -> String {
    format!(
        "status=running&target_uri={}",
        crate::util::percent_encode(SWUPDATE_TARGET_URI)
    )
}

/// What: Poll a task until it leaves the `running` state.
///
/// Inputs:
/// - `gateway`: Remote to poll.
/// - `task`: Task as last seen (returned immediately when already terminal).
/// - `interval`: Delay between polls.
/// - `on_progress`: Called with every observed `running` snapshot.
///
/// Output:
/// - The terminal task, or the first gateway error.
///
/// # Errors
/// - Returns the gateway error of the first failed poll; polling stops there.
pub async fn follow_task<G, F>(
    gateway: &G,
    mut task: Task,
    interval: Duration,
    mut on_progress: F,
) -> Result<Task, GatewayError>
where
    G: Gateway + ?Sized,
    F: FnMut(&Task),
{
    while task.status == TaskStatus::Running {
        on_progress(&task);
        if !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }
        task = gateway.task(&task.id).await?;
    }
    tracing::debug!(task = %task.id, status = ?task.status, "task left running state");
    Ok(task)
}
