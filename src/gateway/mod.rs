//! Remote gateway to the host panel.
//!
//! Every network call the client makes goes through the [`Gateway`] trait.
//! [`HttpGateway`] talks to the panel's REST API. The `mock` module holds an
//! in-memory stand-in for unit and integration tests; it is not part of the
//! documented API.

use std::future::Future;

use crate::state::UpdateCandidate;

pub mod error;
pub mod http;
#[doc(hidden)]
pub mod mock;
pub mod task;
pub mod types;

pub use error::GatewayError;
pub use http::HttpGateway;
pub use task::{Task, TaskStatus};
pub use types::{Capabilities, NewRepository, RepoTool, Repository, RepositoryChanges};

/// Result alias for gateway calls.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// What: Request/response boundary to the panel.
///
/// Details:
/// - Each method is one remote call; none of them retry.
/// - Futures are `Send` so callers can drive them from spawned tasks.
pub trait Gateway: Send + Sync {
    /// Host capability flags.
    fn capabilities(&self) -> impl Future<Output = Result<Capabilities>> + Send;

    /// All configured repositories.
    fn list_repositories(&self) -> impl Future<Output = Result<Vec<Repository>>> + Send;

    /// Create a repository.
    fn add_repository(
        &self,
        repo: &NewRepository,
    ) -> impl Future<Output = Result<Repository>> + Send;

    /// Edit an existing repository.
    fn update_repository(
        &self,
        repo_id: &str,
        changes: &RepositoryChanges,
    ) -> impl Future<Output = Result<Repository>> + Send;

    /// Enable (`true`) or disable (`false`) a repository.
    fn enable_repository(
        &self,
        repo_id: &str,
        enable: bool,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Remove a repository.
    fn delete_repository(&self, repo_id: &str) -> impl Future<Output = Result<()>> + Send;

    /// Packages with an update available.
    fn list_software_updates(&self) -> impl Future<Output = Result<Vec<UpdateCandidate>>> + Send;

    /// Dependency names of one package.
    fn package_deps(&self, name: &str) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Start updating one package; returns the spawned task.
    fn update_software(&self, name: &str) -> impl Future<Output = Result<Task>> + Send;

    /// Start a whole-system update; returns the spawned task.
    fn update_all_software(&self) -> impl Future<Output = Result<Task>> + Send;

    /// Tasks matching a raw query filter such as `status=running&target_uri=...`.
    fn tasks_by_filter(&self, filter: &str) -> impl Future<Output = Result<Vec<Task>>> + Send;

    /// A single task by id.
    fn task(&self, id: &str) -> impl Future<Output = Result<Task>> + Send;
}
