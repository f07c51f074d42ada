//! In-memory gateway used by tests.
//!
//! Holds scripted answers for every remote call and records what was asked,
//! so flows can be checked without a panel server.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{
    Capabilities, Gateway, GatewayError, NewRepository, Repository, RepositoryChanges, Result,
    Task, TaskStatus,
};
use crate::state::UpdateCandidate;

/// Mutable state behind the mock's lock.
#[derive(Debug, Default)]
struct MockState {
    capabilities: Option<Capabilities>,
    repositories: Vec<Repository>,
    repo_errors: HashMap<String, GatewayError>,
    list_repositories_error: Option<GatewayError>,
    updates: Vec<UpdateCandidate>,
    list_updates_error: Option<GatewayError>,
    deps: HashMap<String, Vec<String>>,
    deps_errors: HashMap<String, GatewayError>,
    update_results: HashMap<String, (TaskStatus, String)>,
    update_errors: HashMap<String, GatewayError>,
    tasks: HashMap<String, VecDeque<Task>>,
    calls: Vec<String>,
    open_updates: usize,
    max_open_updates: usize,
}

/// Scriptable in-memory [`Gateway`].
#[derive(Debug, Default)]
pub struct MockGateway {
    state: Mutex<MockState>,
}

/// What: Build a task snapshot.
fn task(id: &str, status: TaskStatus, message: &str) -> Task {
    Task {
        id: id.to_string(),
        status,
        message: message.to_string(),
        target_uri: String::new(),
    }
}

/// What: 404 rejection for unknown resources.
fn not_found(what: &str) -> GatewayError {
    GatewayError::RemoteRejected {
        status: 404,
        reason: format!("{what} not found"),
    }
}

impl MockGateway {
    /// Empty mock: no repositories, no updates, no capabilities.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the state, recovering from a poisoned lock.
    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answer for `capabilities`.
    #[must_use]
    pub fn with_capabilities(self, caps: Capabilities) -> Self {
        self.lock().capabilities = Some(caps);
        self
    }

    /// Repositories returned by `list_repositories`.
    #[must_use]
    pub fn with_repositories(self, repos: Vec<Repository>) -> Self {
        self.lock().repositories = repos;
        self
    }

    /// Make `list_repositories` fail.
    #[must_use]
    pub fn with_list_repositories_error(self, err: GatewayError) -> Self {
        self.lock().list_repositories_error = Some(err);
        self
    }

    /// Make enable/delete calls for `repo_id` fail.
    #[must_use]
    pub fn with_repository_error(self, repo_id: &str, err: GatewayError) -> Self {
        self.lock().repo_errors.insert(repo_id.to_string(), err);
        self
    }

    /// Candidates returned by `list_software_updates`, built from names.
    #[must_use]
    pub fn with_updates(self, names: &[&str]) -> Self {
        self.lock().updates = names
            .iter()
            .map(|n| UpdateCandidate {
                package_name: (*n).to_string(),
                version: "1.0".to_string(),
                arch: "x86_64".to_string(),
                repository: "updates".to_string(),
            })
            .collect();
        self
    }

    /// Make `list_software_updates` fail.
    #[must_use]
    pub fn with_list_updates_error(self, err: GatewayError) -> Self {
        self.lock().list_updates_error = Some(err);
        self
    }

    /// Dependency list of `name`.
    #[must_use]
    pub fn with_deps(self, name: &str, deps: &[&str]) -> Self {
        self.lock().deps.insert(
            name.to_string(),
            deps.iter().map(|d| (*d).to_string()).collect(),
        );
        self
    }

    /// Make `package_deps(name)` fail.
    #[must_use]
    pub fn with_deps_error(self, name: &str, err: GatewayError) -> Self {
        self.lock().deps_errors.insert(name.to_string(), err);
        self
    }

    /// Terminal status and message the update task of `name` ends with.
    #[must_use]
    pub fn with_update_result(self, name: &str, status: TaskStatus, message: &str) -> Self {
        self.lock()
            .update_results
            .insert(name.to_string(), (status, message.to_string()));
        self
    }

    /// Make `update_software(name)` fail.
    #[must_use]
    pub fn with_update_error(self, name: &str, err: GatewayError) -> Self {
        self.lock().update_errors.insert(name.to_string(), err);
        self
    }

    /// Register a task and the snapshots successive `task(id)` polls return.
    ///
    /// The last snapshot repeats once the script is exhausted.
    #[must_use]
    pub fn with_task_script(self, snapshots: Vec<Task>) -> Self {
        if let Some(first) = snapshots.first() {
            let id = first.id.clone();
            self.lock().tasks.insert(id, snapshots.into_iter().collect());
        }
        self
    }

    /// Every call made so far, formatted as `method:arg`.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Package names passed to `update_software`, in call order.
    #[must_use]
    pub fn update_calls(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| c.strip_prefix("update_software:").map(str::to_string))
            .collect()
    }

    /// Highest number of package updates that were open at the same time.
    #[must_use]
    pub fn max_open_updates(&self) -> usize {
        self.lock().max_open_updates
    }

    /// Current repository list.
    #[must_use]
    pub fn repositories(&self) -> Vec<Repository> {
        self.lock().repositories.clone()
    }

    /// Record a call.
    fn record(&self, call: String) {
        self.lock().calls.push(call);
    }
}

impl Gateway for MockGateway {
    async fn capabilities(&self) -> Result<Capabilities> {
        self.record("capabilities".into());
        self.lock()
            .capabilities
            .ok_or_else(|| GatewayError::RemoteUnavailable("capabilities unavailable".into()))
    }

    async fn list_repositories(&self) -> Result<Vec<Repository>> {
        self.record("list_repositories".into());
        let st = self.lock();
        match &st.list_repositories_error {
            Some(err) => Err(err.clone()),
            None => Ok(st.repositories.clone()),
        }
    }

    async fn add_repository(&self, repo: &NewRepository) -> Result<Repository> {
        self.record(format!("add_repository:{}", repo.repo_id));
        let mut st = self.lock();
        if st.repositories.iter().any(|r| r.repo_id == repo.repo_id) {
            return Err(GatewayError::RemoteRejected {
                status: 400,
                reason: format!("repository {} already exists", repo.repo_id),
            });
        }
        let created = Repository {
            repo_id: repo.repo_id.clone(),
            enabled: true,
            baseurl: repo.baseurl.clone(),
            config: repo.config.clone(),
        };
        st.repositories.push(created.clone());
        Ok(created)
    }

    async fn update_repository(
        &self,
        repo_id: &str,
        changes: &RepositoryChanges,
    ) -> Result<Repository> {
        self.record(format!("update_repository:{repo_id}"));
        let mut st = self.lock();
        let repo = st
            .repositories
            .iter_mut()
            .find(|r| r.repo_id == repo_id)
            .ok_or_else(|| not_found(repo_id))?;
        if let Some(url) = &changes.baseurl {
            repo.baseurl.clone_from(url);
        }
        for (k, v) in &changes.config {
            repo.config.insert(k.clone(), v.clone());
        }
        Ok(repo.clone())
    }

    async fn enable_repository(&self, repo_id: &str, enable: bool) -> Result<()> {
        self.record(format!("enable_repository:{repo_id}:{enable}"));
        let mut st = self.lock();
        if let Some(err) = st.repo_errors.get(repo_id) {
            return Err(err.clone());
        }
        let repo = st
            .repositories
            .iter_mut()
            .find(|r| r.repo_id == repo_id)
            .ok_or_else(|| not_found(repo_id))?;
        repo.enabled = enable;
        Ok(())
    }

    async fn delete_repository(&self, repo_id: &str) -> Result<()> {
        self.record(format!("delete_repository:{repo_id}"));
        let mut st = self.lock();
        if let Some(err) = st.repo_errors.get(repo_id) {
            return Err(err.clone());
        }
        let before = st.repositories.len();
        st.repositories.retain(|r| r.repo_id != repo_id);
        if st.repositories.len() == before {
            return Err(not_found(repo_id));
        }
        Ok(())
    }

    async fn list_software_updates(&self) -> Result<Vec<UpdateCandidate>> {
        self.record("list_software_updates".into());
        let st = self.lock();
        match &st.list_updates_error {
            Some(err) => Err(err.clone()),
            None => Ok(st.updates.clone()),
        }
    }

    async fn package_deps(&self, name: &str) -> Result<Vec<String>> {
        self.record(format!("package_deps:{name}"));
        // Let concurrent fetches interleave.
        tokio::task::yield_now().await;
        let st = self.lock();
        if let Some(err) = st.deps_errors.get(name) {
            return Err(err.clone());
        }
        Ok(st.deps.get(name).cloned().unwrap_or_default())
    }

    async fn update_software(&self, name: &str) -> Result<Task> {
        self.record(format!("update_software:{name}"));
        let mut st = self.lock();
        if let Some(err) = st.update_errors.get(name) {
            return Err(err.clone());
        }
        let id = format!("pkg-{name}");
        let (status, message) = st
            .update_results
            .get(name)
            .cloned()
            .unwrap_or((TaskStatus::Finished, String::new()));
        st.tasks
            .insert(id.clone(), VecDeque::from([task(&id, status, &message)]));
        st.open_updates += 1;
        st.max_open_updates = st.max_open_updates.max(st.open_updates);
        Ok(task(&id, TaskStatus::Running, ""))
    }

    async fn update_all_software(&self) -> Result<Task> {
        self.record("update_all_software".into());
        let mut st = self.lock();
        let id = "swupdate".to_string();
        if !st.tasks.contains_key(&id) {
            st.tasks.insert(
                id.clone(),
                VecDeque::from([task(&id, TaskStatus::Finished, "all packages updated")]),
            );
        }
        Ok(task(&id, TaskStatus::Running, ""))
    }

    async fn tasks_by_filter(&self, filter: &str) -> Result<Vec<Task>> {
        self.record(format!("tasks_by_filter:{filter}"));
        let only_running = filter.contains("status=running");
        let st = self.lock();
        let mut out: Vec<Task> = st
            .tasks
            .values()
            .filter_map(|q| q.front().cloned())
            .filter(|t| !only_running || t.status == TaskStatus::Running)
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(out)
    }

    async fn task(&self, id: &str) -> Result<Task> {
        self.record(format!("task:{id}"));
        let mut st = self.lock();
        let queue = st.tasks.get_mut(id).ok_or_else(|| not_found(id))?;
        let snapshot = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
        .ok_or_else(|| not_found(id))?;
        if id.starts_with("pkg-") && snapshot.status != TaskStatus::Running {
            st.open_updates = st.open_updates.saturating_sub(1);
        }
        Ok(snapshot)
    }
}
