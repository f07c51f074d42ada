//! Update and repository logic independent of any front end.

pub mod deps;
pub mod orchestrator;
pub mod projector;
pub mod repos;

pub use deps::{dependency_warning, resolve, resolve_with_deps};
pub use orchestrator::{Orchestrator, RunEvent, RunOutcome, Step};
pub use projector::{RowDisplay, RowStates, StatusIcon, project, project_run};
pub use repos::{RepoListing, RepositoryController, ToolbarState, columns_for, toolbar_state};
