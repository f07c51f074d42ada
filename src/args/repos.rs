//! Command-line repository management.

use hostupd::app::HostUpdatePage;
use hostupd::gateway::{Gateway, NewRepository, Repository, RepositoryChanges};
use hostupd::logic::repos::{BulkOutcome, RepoListing, delete_confirmation, toolbar_state};

use super::definition::ReposCommand;
use super::utils::{confirm, parse_setting_pairs};
use super::{CliError, output};

/// What: Fetch the repository list or fail with its empty-state text.
async fn fetch<G: Gateway + 'static>(page: &HostUpdatePage<G>) -> Result<Vec<Repository>, CliError> {
    match page.repositories().list().await {
        RepoListing::Rows(repos) => Ok(repos),
        RepoListing::Empty(msg) => Err(CliError::Failed(msg)),
    }
}

/// What: Pick the repositories named by `ids`, in argument order.
///
/// # Errors
/// - `CliError::Usage` naming every id that is not configured.
fn select(repos: &[Repository], ids: &[String]) -> Result<Vec<Repository>, CliError> {
    let missing: Vec<&str> = ids
        .iter()
        .filter(|id| !repos.iter().any(|r| &r.repo_id == *id))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        return Err(CliError::Usage(format!(
            "unknown repositories: {}",
            missing.join(", ")
        )));
    }
    Ok(ids
        .iter()
        .filter_map(|id| repos.iter().find(|r| &r.repo_id == id).cloned())
        .collect())
}

/// What: Print a bulk outcome and fail when any repository failed.
fn report(verb: &str, outcome: &BulkOutcome) -> Result<(), CliError> {
    for id in &outcome.succeeded {
        println!("{verb} {id}");
    }
    for (id, err) in &outcome.failed {
        eprintln!("{id}: {}", err.user_message());
    }
    if outcome.failed.is_empty() {
        Ok(())
    } else {
        Err(CliError::Failed(format!(
            "{} of {} repositories failed",
            outcome.failed.len(),
            outcome.failed.len() + outcome.succeeded.len()
        )))
    }
}

/// What: Handle a `repos` subcommand.
///
/// Inputs:
/// - `page`: Opened page.
/// - `action`: Parsed repository action.
/// - `assume_yes`: Skip the delete confirmation.
///
/// # Errors
/// - `Unsupported` when the host has no repository tool; otherwise the action's error.
pub async fn handle<G: Gateway + 'static>(
    page: &HostUpdatePage<G>,
    action: &ReposCommand,
    assume_yes: bool,
) -> Result<(), CliError> {
    if !page.sections().repositories {
        return Err(CliError::Unsupported("repository management"));
    }
    let tool = page.capabilities().repo_tool;
    match action {
        ReposCommand::List => {
            let repos = fetch(page).await?;
            if repos.is_empty() {
                println!("No repositories configured.");
            } else {
                print!("{}", output::repositories_table(tool, &repos));
            }
            Ok(())
        }
        ReposCommand::Add { id, url, settings } => {
            let repo = NewRepository {
                repo_id: id.clone(),
                baseurl: url.clone(),
                config: parse_setting_pairs(settings)?,
            };
            let created = page.repositories().add(&repo).await?;
            println!("Added {}", if created.repo_id.is_empty() { &created.baseurl } else { &created.repo_id });
            Ok(())
        }
        ReposCommand::Edit { id, url, settings } => {
            let selection = select(&fetch(page).await?, std::slice::from_ref(id))?;
            let changes = RepositoryChanges {
                baseurl: url.clone(),
                config: parse_setting_pairs(settings)?,
            };
            if changes.is_empty() {
                return Err(CliError::Usage("nothing to change: pass --url or --set".into()));
            }
            match page.repositories().edit(&selection, &changes).await? {
                Some(updated) => println!("Updated {}", updated.repo_id),
                None => println!("Nothing changed."),
            }
            Ok(())
        }
        ReposCommand::Toggle { ids } => {
            let selection = select(&fetch(page).await?, ids)?;
            let toolbar = toolbar_state(&selection);
            tracing::debug!(label = toolbar.toggle_label.as_str(), "toggling repositories");
            let outcome = page.repositories().toggle(&selection).await;
            report("Toggled", &outcome)
        }
        ReposCommand::Remove { ids } => {
            let selection = select(&fetch(page).await?, ids)?;
            let Some(prompt) = delete_confirmation(&selection) else {
                return Ok(());
            };
            println!("{}\n{}", prompt.title, prompt.content);
            if !confirm("Delete?", assume_yes) {
                println!("Nothing deleted.");
                return Ok(());
            }
            let outcome = page.repositories().delete(&selection).await;
            report("Deleted", &outcome)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(id: &str) -> Repository {
        Repository {
            repo_id: id.to_string(),
            ..Repository::default()
        }
    }

    #[test]
    /// What: Selection keeps argument order and names unknown ids.
    ///
    /// Inputs:
    /// - Configured `a`, `b`; requested `b, a`, then `a, zz`.
    ///
    /// Output:
    /// - `[b, a]`, then a usage error naming `zz`.
    fn select_orders_and_rejects_unknown() {
        let repos = vec![repo("a"), repo("b")];
        let picked = select(&repos, &["b".into(), "a".into()]).expect("known ids");
        let ids: Vec<&str> = picked.iter().map(|r| r.repo_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        match select(&repos, &["a".into(), "zz".into()]) {
            Err(CliError::Usage(msg)) => assert!(msg.contains("zz")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
