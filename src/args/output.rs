//! Terminal rendering of run events, listings and capabilities.

use hostupd::app::HostUpdatePage;
use hostupd::gateway::{Gateway, RepoTool, Repository};
use hostupd::logic::orchestrator::RunEvent;
use hostupd::logic::projector::{RowDisplay, RowStates};
use hostupd::logic::repos::columns_for;
use hostupd::state::UpdateCandidate;
use hostupd::util::{now_stamp, render_table};
use tokio::sync::mpsc;

/// What: One progress line for a projected row.
///
/// Output:
/// - `<glyph> <package>  <tooltip>`, with a note for rows covered by another package.
#[must_use]
pub fn format_row(row: &RowDisplay) -> String {
    let note = if row.implicit { " (with dependent)" } else { "" };
    format!("{} {}  {}{note}", row.icon.glyph(), row.package, row.tooltip)
}

/// What: Print run events until every sender is gone.
///
/// Output:
/// - The last display state of every row touched.
pub async fn print_events(mut rx: mpsc::UnboundedReceiver<RunEvent>) -> RowStates {
    let mut rows = RowStates::new();
    while let Some(event) = rx.recv().await {
        match event {
            RunEvent::Rows(batch) => {
                for row in &batch {
                    println!("[{}] {}", now_stamp(), format_row(row));
                }
                rows.apply(batch);
            }
            RunEvent::Progress(text) => println!("{}", text.trim_end()),
            RunEvent::Error(msg) => eprintln!("error: {msg}"),
            RunEvent::ControlsEnabled(enabled) => {
                tracing::debug!(enabled, "apply controls");
            }
            RunEvent::Listing(candidates) => {
                rows.clear();
                println!("{} update(s) still available", candidates.len());
            }
            RunEvent::ListingFailed(msg) => eprintln!("{msg}"),
        }
    }
    rows
}

/// What: Render the update listing.
#[must_use]
pub fn updates_table(candidates: &[UpdateCandidate]) -> String {
    let rows: Vec<Vec<String>> = candidates
        .iter()
        .map(|c| {
            vec![
                c.package_name.clone(),
                c.version.clone(),
                c.arch.clone(),
                c.repository.clone(),
            ]
        })
        .collect();
    render_table(&["Package", "Version", "Arch", "Repository"], &rows)
}

/// What: Render repositories with the columns of the host's tool family.
#[must_use]
pub fn repositories_table(tool: RepoTool, repos: &[Repository]) -> String {
    let columns = columns_for(tool);
    let headers: Vec<&str> = columns.iter().map(|c| c.title()).collect();
    let rows: Vec<Vec<String>> = repos
        .iter()
        .map(|r| columns.iter().map(|c| c.cell(r)).collect())
        .collect();
    render_table(&headers, &rows)
}

/// Print capability flags and the sections they enable.
pub fn print_capabilities<G: Gateway + 'static>(page: &HostUpdatePage<G>) {
    let caps = page.capabilities();
    let sections = page.sections();
    println!("update tool:      {}", if caps.update_tool { "yes" } else { "no" });
    println!("repository tool:  {}", caps.repo_tool.as_str());
    println!(
        "sections:         updates={} repositories={}",
        sections.updates, sections.repositories
    );
}
