//! Dependency resolution for a user selection.
//!
//! Turns the selected package names into ordered [`SelectionEntry`] values:
//! which dependencies were left unselected, and which selected packages are
//! already covered by another selected package's update.

use std::collections::{HashMap, HashSet};

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::Instrument;

use crate::gateway::Gateway;
use crate::state::{SelectionEntry, UpdateCandidate};

/// What: Resolve a selection against the remote dependency data.
///
/// Inputs:
/// - `gateway`: Remote used for `package_deps` lookups.
/// - `selected`: Selected package names in selection order.
/// - `candidates`: Full current listing of update candidates.
///
/// Output:
/// - One entry per distinct selected name, in selection order.
///
/// Details:
/// - All dependency lookups are issued concurrently and joined before resolution.
/// - A failed lookup counts as an empty dependency list; the run is never blocked on it.
pub async fn resolve<G>(
    gateway: &G,
    selected: &[String],
    candidates: &[UpdateCandidate],
) -> Vec<SelectionEntry>
where
    G: Gateway + ?Sized,
{
    let names = dedup_selection(selected);
    let span = tracing::info_span!("resolve_dependencies", selected = names.len());
    fetch_and_resolve(gateway, &names, candidates)
        .instrument(span)
        .await
}

/// What: Fetch all dependency lists concurrently, then resolve.
async fn fetch_and_resolve<G>(
    gateway: &G,
    names: &[String],
    candidates: &[UpdateCandidate],
) -> Vec<SelectionEntry>
where
    G: Gateway + ?Sized,
{
    let start_time = std::time::Instant::now();

    let mut fetches = FuturesUnordered::new();
    for name in names {
        fetches.push(async move { (name.clone(), gateway.package_deps(name).await) });
    }
    let mut deps: HashMap<String, Vec<String>> = HashMap::with_capacity(names.len());
    while let Some((name, result)) = fetches.next().await {
        match result {
            Ok(list) => {
                tracing::debug!(package = %name, count = list.len(), "dependencies fetched");
                deps.insert(name, list);
            }
            Err(e) => {
                tracing::warn!(
                    package = %name,
                    error = %e,
                    "dependency lookup failed; treating as no dependencies"
                );
                deps.insert(name, Vec::new());
            }
        }
    }

    let candidate_names: HashSet<&str> = candidates
        .iter()
        .map(|c| c.package_name.as_str())
        .collect();
    let entries = resolve_with_deps(names, &candidate_names, &deps);
    tracing::info!(
        selected = entries.len(),
        derived = entries.iter().filter(|e| e.is_dependency_of_selected).count(),
        elapsed_ms = start_time.elapsed().as_millis(),
        "selection resolved"
    );
    entries
}

/// What: Drop repeated names, keeping the first occurrence.
fn dedup_selection(selected: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(selected.len());
    selected
        .iter()
        .filter(|n| seen.insert(n.as_str()))
        .cloned()
        .collect()
}

/// What: Build selection entries from already-fetched dependency lists.
///
/// Inputs:
/// - `selected`: Distinct selected names in selection order.
/// - `candidate_names`: Names of every listed update candidate.
/// - `deps`: Dependency list per selected name; missing names mean "no dependencies".
///
/// Output:
/// - Entries in the order of `selected`.
///
/// Details:
/// - `depends_not_selected` keeps dependencies that are listed candidates but not
///   selected, without duplicates or self references, in dependency order.
/// - Derivation pass: walking the selection in order, every entry marks each other
///   selected package it depends on, including entries that are derived themselves,
///   so chains collapse onto the applied entry at their head.
/// - A target is left alone when it is the applied entry covering the source. With
///   mutual references or cycles the earlier selection wins and stays applied.
/// - Entries are only ever promoted to "dependency", never demoted.
#[must_use]
pub fn resolve_with_deps(
    selected: &[String],
    candidate_names: &HashSet<&str>,
    deps: &HashMap<String, Vec<String>>,
) -> Vec<SelectionEntry> {
    let selected_set: HashSet<&str> = selected.iter().map(String::as_str).collect();
    let index: HashMap<&str, usize> = selected
        .iter()
        .enumerate()
        .map(|(i, n)| (n.as_str(), i))
        .collect();

    let mut entries: Vec<SelectionEntry> = selected
        .iter()
        .map(|name| {
            let mut entry = SelectionEntry::new(name.clone());
            entry.dependencies = deps.get(name).cloned().unwrap_or_default();
            let mut seen = HashSet::new();
            entry.depends_not_selected = entry
                .dependencies
                .iter()
                .filter(|d| {
                    d.as_str() != name.as_str()
                        && candidate_names.contains(d.as_str())
                        && !selected_set.contains(d.as_str())
                })
                .filter(|d| seen.insert(d.as_str()))
                .cloned()
                .collect();
            entry
        })
        .collect();

    // Applied entry whose update covers each derived entry.
    let mut covered_by: Vec<Option<usize>> = vec![None; entries.len()];
    for source in 0..entries.len() {
        entries[source].visited = true;
        let root = covering_root(&covered_by, source);
        let targets: Vec<usize> = entries[source]
            .dependencies
            .iter()
            .filter_map(|d| index.get(d.as_str()).copied())
            .filter(|&i| i != source)
            .collect();
        for i in targets {
            if entries[i].is_dependency_of_selected || i == root {
                continue;
            }
            tracing::debug!(
                package = %entries[i].package_name,
                required_by = %entries[source].package_name,
                "selected package covered by a dependent"
            );
            entries[i].is_dependency_of_selected = true;
            covered_by[i] = Some(source);
        }
    }
    entries
}

/// What: Follow `covered_by` links up to the entry that is actually applied.
///
/// Details:
/// - A link is only added from an unlinked entry to a source outside its own chain,
///   so the links form a forest and the walk ends at an entry with no link.
fn covering_root(covered_by: &[Option<usize>], mut at: usize) -> usize {
    while let Some(next) = covered_by[at] {
        at = next;
    }
    at
}

/// What: Build the confirmation text listing unselected dependencies.
///
/// Inputs:
/// - `entries`: Resolved selection.
///
/// Output:
/// - `None` when nothing is missing; otherwise one `name: dep1, dep2` line per entry.
#[must_use]
pub fn dependency_warning(entries: &[SelectionEntry]) -> Option<String> {
    let lines: Vec<String> = entries
        .iter()
        .filter(|e| !e.depends_not_selected.is_empty())
        .map(|e| format!("{}: {}", e.package_name, e.depends_not_selected.join(", ")))
        .collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
