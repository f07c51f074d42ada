//! Repository list controller.
//!
//! Lists, adds, edits, toggles and deletes repositories through the gateway
//! and derives the toolbar state, grid columns and delete confirmation text
//! from the current selection.

use std::sync::Arc;

use crate::gateway::{
    Gateway, GatewayError, NewRepository, RepoTool, Repository, RepositoryChanges,
};
use crate::state::{Topic, TopicBus};

/// Empty-state text used when a failed listing carries no reason.
pub const DEFAULT_LIST_ERROR: &str = "Unable to list repositories.";

/// Label of the enable/disable toolbar action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleLabel {
    /// Every selected repository is disabled, or nothing is selected.
    Enable,
    /// Every selected repository is enabled.
    Disable,
    /// The selection mixes enabled and disabled repositories.
    Toggle,
}

impl ToggleLabel {
    /// Button text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enable => "Enable",
            Self::Disable => "Disable",
            Self::Toggle => "Toggle",
        }
    }
}

/// Enablement of the repository toolbar actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ToolbarState {
    /// Add is always available.
    pub add: bool,
    /// Edit needs exactly one selected repository.
    pub edit: bool,
    /// Enable/disable.
    pub toggle: bool,
    /// Remove.
    pub remove: bool,
    /// Label shown on the enable/disable action.
    pub toggle_label: ToggleLabel,
}

/// What: Toolbar state for a selection.
///
/// Inputs:
/// - `selection`: Currently selected repositories.
///
/// Output:
/// - Enablement per action and the toggle label.
///
/// Details:
/// - Empty: only add. One: everything. Several: everything but edit.
/// - The label follows the shared `enabled` flag and becomes `Toggle` when mixed.
#[must_use]
pub fn toolbar_state(selection: &[Repository]) -> ToolbarState {
    let any = !selection.is_empty();
    let toggle_label = match selection.first() {
        None => ToggleLabel::Enable,
        Some(first) if selection.iter().any(|r| r.enabled != first.enabled) => {
            ToggleLabel::Toggle
        }
        Some(first) if first.enabled => ToggleLabel::Disable,
        Some(_) => ToggleLabel::Enable,
    };
    ToolbarState {
        add: true,
        edit: selection.len() == 1,
        toggle: any,
        remove: any,
        toggle_label,
    }
}

/// A grid column of the repository listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Column {
    /// Repository identifier.
    RepoId,
    /// `config.display_repo_name`.
    DisplayName,
    /// Enabled flag.
    Enabled,
    /// Base URL.
    BaseUrl,
    /// `config.dist`.
    Dist,
    /// `config.comps`.
    Comps,
}

impl Column {
    /// Column header.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::RepoId => "ID",
            Self::DisplayName => "Name",
            Self::Enabled => "Enabled",
            Self::BaseUrl => "URL",
            Self::Dist => "Distribution",
            Self::Comps => "Components",
        }
    }

    /// What: Cell text of this column for `repo`.
    #[must_use]
    pub fn cell(self, repo: &Repository) -> String {
        match self {
            Self::RepoId => repo.repo_id.clone(),
            Self::DisplayName => repo.config_text("display_repo_name"),
            Self::Enabled => (if repo.enabled { "yes" } else { "no" }).to_string(),
            Self::BaseUrl => repo.baseurl.clone(),
            Self::Dist => repo.config_text("dist"),
            Self::Comps => repo.config_text("comps"),
        }
    }
}

/// What: Grid columns for a repository tool family.
///
/// Output:
/// - yum: id, name, enabled. deb: url, enabled, dist, comps. Other: id, enabled, url.
#[must_use]
pub const fn columns_for(tool: RepoTool) -> &'static [Column] {
    match tool {
        RepoTool::Yum => &[Column::RepoId, Column::DisplayName, Column::Enabled],
        RepoTool::Deb => &[Column::BaseUrl, Column::Enabled, Column::Dist, Column::Comps],
        RepoTool::None => &[Column::RepoId, Column::Enabled, Column::BaseUrl],
    }
}

/// Text of a confirmation prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Confirmation {
    /// Prompt title.
    pub title: String,
    /// Prompt body.
    pub content: String,
}

/// What: Confirmation shown before deleting `selection`.
///
/// Output:
/// - `None` for an empty selection; singular text naming the repository for one;
///   plural text for several.
#[must_use]
pub fn delete_confirmation(selection: &[Repository]) -> Option<Confirmation> {
    match selection {
        [] => None,
        [one] => Some(Confirmation {
            title: "Delete repository".to_string(),
            content: format!(
                "Repository {} will be removed from the host. This cannot be undone.",
                one.repo_id
            ),
        }),
        many => Some(Confirmation {
            title: "Delete repositories".to_string(),
            content: format!(
                "{} selected repositories will be removed from the host. This cannot be undone.",
                many.len()
            ),
        }),
    }
}

/// Result of a listing request, ready for display.
#[derive(Clone, Debug, PartialEq)]
pub enum RepoListing {
    /// Repositories to show.
    Rows(Vec<Repository>),
    /// Listing failed; text for the grid's empty-state area.
    Empty(String),
}

/// Per-repository outcome of a bulk action.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BulkOutcome {
    /// Repositories the action succeeded for.
    pub succeeded: Vec<String>,
    /// Repositories the action failed for, with the error.
    pub failed: Vec<(String, GatewayError)>,
}

impl BulkOutcome {
    /// `true` when nothing was attempted.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.succeeded.is_empty() && self.failed.is_empty()
    }
}

/// Controller for the repository section of a page.
#[derive(Debug)]
pub struct RepositoryController<G> {
    gateway: Arc<G>,
    topics: TopicBus,
}

impl<G: Gateway> RepositoryController<G> {
    /// Controller publishing changes on `topics`.
    pub const fn new(gateway: Arc<G>, topics: TopicBus) -> Self {
        Self { gateway, topics }
    }

    /// What: Fetch the repository list.
    ///
    /// Output:
    /// - `Rows` on success, `Empty` with the server reason (or a default text) on error.
    pub async fn list(&self) -> RepoListing {
        match self.gateway.list_repositories().await {
            Ok(repos) => {
                tracing::debug!(count = repos.len(), "repositories listed");
                RepoListing::Rows(repos)
            }
            Err(e) => {
                tracing::warn!(error = %e, "repository listing failed");
                let reason = e.user_message().trim();
                RepoListing::Empty(if reason.is_empty() {
                    DEFAULT_LIST_ERROR.to_string()
                } else {
                    reason.to_string()
                })
            }
        }
    }

    /// What: Create a repository and announce it.
    ///
    /// # Errors
    /// - Returns the gateway error when the panel refuses or is unreachable.
    pub async fn add(&self, repo: &NewRepository) -> Result<Repository, GatewayError> {
        let created = self.gateway.add_repository(repo).await?;
        tracing::info!(repo = %created.repo_id, "repository added");
        self.topics.publish(Topic::RepositoryAdded);
        Ok(created)
    }

    /// What: Edit the single selected repository.
    ///
    /// Inputs:
    /// - `selection`: Selected repositories; must hold exactly one.
    /// - `changes`: Fields to overwrite.
    ///
    /// Output:
    /// - `Ok(None)` when the selection is not a single repository or nothing changes.
    ///
    /// # Errors
    /// - Returns the gateway error when the update is refused.
    pub async fn edit(
        &self,
        selection: &[Repository],
        changes: &RepositoryChanges,
    ) -> Result<Option<Repository>, GatewayError> {
        let [repo] = selection else {
            tracing::debug!(selected = selection.len(), "edit ignored: needs exactly one repository");
            return Ok(None);
        };
        if changes.is_empty() {
            tracing::debug!(repo = %repo.repo_id, "edit ignored: no changes");
            return Ok(None);
        }
        let updated = self
            .gateway
            .update_repository(&repo.repo_id, changes)
            .await?;
        tracing::info!(repo = %updated.repo_id, "repository updated");
        self.topics.publish(Topic::RepositoryUpdated);
        Ok(Some(updated))
    }

    /// What: Flip the enabled flag of every selected repository.
    ///
    /// Output:
    /// - Per-repository outcome; empty for an empty selection.
    ///
    /// Details:
    /// - Each repository flips from its own current state, so a mixed selection stays mixed.
    pub async fn toggle(&self, selection: &[Repository]) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();
        if selection.is_empty() {
            tracing::debug!("toggle ignored: empty selection");
            return outcome;
        }
        for repo in selection {
            let enable = !repo.enabled;
            match self.gateway.enable_repository(&repo.repo_id, enable).await {
                Ok(()) => {
                    tracing::info!(repo = %repo.repo_id, enabled = enable, "repository toggled");
                    self.topics.publish(Topic::RepositoryUpdated);
                    outcome.succeeded.push(repo.repo_id.clone());
                }
                Err(e) => {
                    tracing::warn!(repo = %repo.repo_id, error = %e, "repository toggle failed");
                    outcome.failed.push((repo.repo_id.clone(), e));
                }
            }
        }
        outcome
    }

    /// What: Delete every selected repository.
    ///
    /// Output:
    /// - Per-repository outcome; empty for an empty selection.
    ///
    /// Details:
    /// - A deleted topic carrying the id is published per successful delete.
    pub async fn delete(&self, selection: &[Repository]) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();
        if selection.is_empty() {
            tracing::debug!("delete ignored: empty selection");
            return outcome;
        }
        for repo in selection {
            match self.gateway.delete_repository(&repo.repo_id).await {
                Ok(()) => {
                    tracing::info!(repo = %repo.repo_id, "repository deleted");
                    self.topics
                        .publish(Topic::RepositoryDeleted(repo.repo_id.clone()));
                    outcome.succeeded.push(repo.repo_id.clone());
                }
                Err(e) => {
                    tracing::warn!(repo = %repo.repo_id, error = %e, "repository delete failed");
                    outcome.failed.push((repo.repo_id.clone(), e));
                }
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::mock::MockGateway;

    fn repo(id: &str, enabled: bool) -> Repository {
        Repository {
            repo_id: id.to_string(),
            enabled,
            baseurl: format!("http://mirror/{id}"),
            config: serde_json::Map::new(),
        }
    }

    #[test]
    /// What: Toolbar enablement follows selection size and homogeneity.
    ///
    /// Inputs:
    /// - Empty, single, homogeneous pair, mixed pair.
    ///
    /// Output:
    /// - Matches the enablement table; label Enable/Disable/Toggle.
    fn toolbar_table() {
        let none = toolbar_state(&[]);
        assert!(none.add && !none.edit && !none.toggle && !none.remove);

        let one = toolbar_state(&[repo("a", true)]);
        assert!(one.add && one.edit && one.toggle && one.remove);
        assert_eq!(one.toggle_label, ToggleLabel::Disable);

        let same = toolbar_state(&[repo("a", false), repo("b", false)]);
        assert!(!same.edit && same.toggle && same.remove);
        assert_eq!(same.toggle_label, ToggleLabel::Enable);

        let mixed = toolbar_state(&[repo("a", true), repo("b", false)]);
        assert!(!mixed.edit && mixed.toggle && mixed.remove);
        assert_eq!(mixed.toggle_label.as_str(), "Toggle");
    }

    #[test]
    /// What: Delete confirmation wording depends on selection size.
    fn delete_confirmation_by_count() {
        assert!(delete_confirmation(&[]).is_none());
        let one = delete_confirmation(&[repo("epel", true)]).expect("single");
        assert_eq!(one.title, "Delete repository");
        assert!(one.content.contains("epel"));
        let many = delete_confirmation(&[repo("a", true), repo("b", true)]).expect("bulk");
        assert_eq!(many.title, "Delete repositories");
        assert!(many.content.starts_with("2 selected"));
    }

    #[test]
    /// What: Deb columns read distribution and components from config.
    fn deb_columns_read_config() {
        let mut r = repo("x", true);
        r.config.insert("dist".into(), "bookworm".into());
        r.config
            .insert("comps".into(), serde_json::json!(["main", "contrib"]));
        let cells: Vec<String> = columns_for(RepoTool::Deb)
            .iter()
            .map(|c| c.cell(&r))
            .collect();
        assert_eq!(cells, vec!["http://mirror/x", "yes", "bookworm", "main contrib"]);
    }

    #[tokio::test]
    /// What: Failed listing becomes an empty-state message.
    ///
    /// Inputs:
    /// - Rejection with a reason, then one with a blank reason.
    ///
    /// Output:
    /// - The reason, then the default text.
    async fn listing_error_becomes_empty_state() {
        let gw = MockGateway::new().with_list_repositories_error(GatewayError::RemoteRejected {
            status: 500,
            reason: "yum lock held".into(),
        });
        let ctl = RepositoryController::new(Arc::new(gw), TopicBus::default());
        assert_eq!(ctl.list().await, RepoListing::Empty("yum lock held".into()));

        let gw = MockGateway::new().with_list_repositories_error(GatewayError::RemoteRejected {
            status: 500,
            reason: String::new(),
        });
        let ctl = RepositoryController::new(Arc::new(gw), TopicBus::default());
        assert_eq!(ctl.list().await, RepoListing::Empty(DEFAULT_LIST_ERROR.into()));
    }

    #[tokio::test]
    /// What: Toggle flips each repository independently and announces updates.
    async fn toggle_flips_each_entry() {
        let gw = Arc::new(
            MockGateway::new().with_repositories(vec![repo("a", true), repo("b", false)]),
        );
        let bus = TopicBus::default();
        let mut rx = bus.subscribe();
        let ctl = RepositoryController::new(Arc::clone(&gw), bus);
        let outcome = ctl.toggle(&gw.repositories()).await;
        assert_eq!(outcome.succeeded, vec!["a".to_string(), "b".to_string()]);
        let now: Vec<bool> = gw.repositories().iter().map(|r| r.enabled).collect();
        assert_eq!(now, vec![false, true]);
        assert_eq!(rx.try_recv().expect("topic"), Topic::RepositoryUpdated);
        assert_eq!(rx.try_recv().expect("topic"), Topic::RepositoryUpdated);
    }

    #[tokio::test]
    /// What: Empty selections are ignored without remote calls.
    async fn empty_selection_is_noop() {
        let gw = Arc::new(MockGateway::new());
        let ctl = RepositoryController::new(Arc::clone(&gw), TopicBus::default());
        assert!(ctl.toggle(&[]).await.is_noop());
        assert!(ctl.delete(&[]).await.is_noop());
        let edited = ctl
            .edit(&[], &RepositoryChanges::default())
            .await
            .expect("no call");
        assert!(edited.is_none());
        assert!(gw.calls().is_empty());
    }

    #[tokio::test]
    /// What: Bulk delete surfaces rejections and publishes per deleted repository.
    ///
    /// Inputs:
    /// - Repositories `a`, `b`; deleting `b` is rejected.
    ///
    /// Output:
    /// - `a` deleted with one topic; `b` reported with the server reason.
    async fn bulk_delete_reports_rejections() {
        let gw = Arc::new(
            MockGateway::new()
                .with_repositories(vec![repo("a", true), repo("b", true)])
                .with_repository_error(
                    "b",
                    GatewayError::RemoteRejected {
                        status: 400,
                        reason: "b is protected".into(),
                    },
                ),
        );
        let bus = TopicBus::default();
        let mut rx = bus.subscribe();
        let ctl = RepositoryController::new(Arc::clone(&gw), bus);
        let outcome = ctl.delete(&gw.repositories()).await;
        assert_eq!(outcome.succeeded, vec!["a".to_string()]);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].1.user_message(), "b is protected");
        assert_eq!(
            rx.try_recv().expect("topic"),
            Topic::RepositoryDeleted("a".into())
        );
        assert!(rx.try_recv().is_err());
    }
}
