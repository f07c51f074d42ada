//! Command-line update listing and update runs.

use hostupd::app::{HostUpdatePage, Resume, listing_error_text};
use hostupd::gateway::{Gateway, TaskStatus};
use hostupd::logic::orchestrator::RunOutcome;
use hostupd::state::UpdateStatus;

use super::utils::{confirm, parse_package_names};
use super::{CliError, output};

/// What: Print the packages that have an update.
///
/// # Errors
/// - `CliError::Failed` with the empty-state text when listing fails.
pub async fn handle_list<G: Gateway>(gateway: &G) -> Result<(), CliError> {
    match gateway.list_software_updates().await {
        Ok(candidates) if candidates.is_empty() => {
            println!("No updates available.");
            Ok(())
        }
        Ok(candidates) => {
            print!("{}", output::updates_table(&candidates));
            Ok(())
        }
        Err(e) => {
            tracing::warn!(error = %e, "update listing failed");
            Err(CliError::Failed(listing_error_text(&e)))
        }
    }
}

/// What: Update the given packages one at a time.
///
/// Inputs:
/// - `page`: Opened page.
/// - `packages`: Raw package arguments.
/// - `assume_yes`: Skip the unselected-dependency confirmation.
///
/// # Errors
/// - Preparation errors, a halted run, or `Failed` when any package failed.
///
/// Details:
/// - Packages covered by another selected package are not updated on their own.
pub async fn handle_update<G: Gateway + 'static>(
    page: &HostUpdatePage<G>,
    packages: &[String],
    assume_yes: bool,
) -> Result<(), CliError> {
    let names = parse_package_names(packages);
    let prepared = page.prepare_run(&names).await?;
    for name in &prepared.unknown {
        eprintln!("{name}: no update available; skipped");
    }
    if let Some(warning) = &prepared.warning {
        println!("These dependencies are not selected and will be updated with the packages that need them:");
        println!("{warning}");
        if !confirm("Continue?", assume_yes) {
            println!("Update cancelled.");
            return Ok(());
        }
    }

    let mut run = prepared.run;
    println!("Updating {}", run.applied_names().join(", "));
    match page.start_run(&mut run).await? {
        RunOutcome::Completed => {
            let failed: Vec<&str> = run
                .entries
                .iter()
                .filter(|e| e.status == UpdateStatus::Failed)
                .map(|e| e.package_name.as_str())
                .collect();
            if failed.is_empty() {
                println!("All updates finished.");
                Ok(())
            } else {
                Err(CliError::Failed(format!("update failed for {}", failed.join(", "))))
            }
        }
        RunOutcome::Halted { cursor, error } => {
            let name = run
                .entries
                .get(cursor)
                .map_or("?", |e| e.package_name.as_str());
            eprintln!("run stopped at {name}");
            page.discard_run();
            Err(CliError::Gateway(error))
        }
        RunOutcome::Cancelled { .. } => Err(CliError::Failed("update cancelled".into())),
    }
}

/// What: Update every package on the host.
///
/// # Errors
/// - Start or poll errors, or `Failed` when the task failed.
pub async fn handle_update_all<G: Gateway + 'static>(
    page: &HostUpdatePage<G>,
    assume_yes: bool,
) -> Result<(), CliError> {
    if !confirm("Update all packages on the host?", assume_yes) {
        println!("Update cancelled.");
        return Ok(());
    }
    let mut transcript = Vec::new();
    let task = page.update_all(&mut transcript).await?;
    match task.status {
        TaskStatus::Finished => Ok(()),
        TaskStatus::Failed | TaskStatus::Running => Err(CliError::Failed(format!(
            "system update {} did not finish",
            task.id
        ))),
    }
}

/// What: Follow a running system update, or show the listing when none runs.
///
/// # Errors
/// - Remote errors, or `Failed` when the followed task failed.
pub async fn handle_resume<G: Gateway + 'static>(page: &HostUpdatePage<G>) -> Result<(), CliError> {
    let mut transcript = Vec::new();
    match page.resume(&mut transcript).await? {
        Resume::Attached(task) if task.status == TaskStatus::Finished => Ok(()),
        Resume::Attached(task) => Err(CliError::Failed(format!(
            "system update {} did not finish",
            task.id
        ))),
        Resume::Fresh(candidates) if candidates.is_empty() => {
            println!("No update running; no updates available.");
            Ok(())
        }
        Resume::Fresh(candidates) => {
            println!("No update running.");
            print!("{}", output::updates_table(&candidates));
            Ok(())
        }
    }
}
