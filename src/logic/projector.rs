//! Status projection onto listing rows.
//!
//! An entry's status is shown on its own row and on every row its update
//! covered implicitly: its unselected dependencies and the selected packages
//! that were derived from it. This is a display decision only; it says
//! nothing about what is actually installed on the host.

use std::collections::{BTreeMap, VecDeque};

use crate::state::{UpdateRun, UpdateStatus};

/// Icon shown in a row's status cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusIcon {
    /// Update in progress.
    Spinner,
    /// Update finished.
    Check,
    /// Update failed.
    Cross,
}

impl StatusIcon {
    /// Single-character glyph for terminal output.
    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Spinner => "…",
            Self::Check => "✔",
            Self::Cross => "✘",
        }
    }
}

/// Display affordance for one listing row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowDisplay {
    /// Package the row belongs to.
    pub package: String,
    /// Status being displayed.
    pub status: UpdateStatus,
    /// Status icon.
    pub icon: StatusIcon,
    /// Tooltip for the icon.
    pub tooltip: &'static str,
    /// Whether the row's selection control stays usable.
    pub selectable: bool,
    /// Whether the row's selection control is shown checked.
    pub checked: bool,
    /// `true` when the row was covered by another package's update.
    pub implicit: bool,
}

/// What: Icon and tooltip for a status.
///
/// Output:
/// - `None` for `Pending`, which has no affordance.
const fn affordance(status: UpdateStatus) -> Option<(StatusIcon, &'static str)> {
    match status {
        UpdateStatus::Pending => None,
        UpdateStatus::Running => Some((StatusIcon::Spinner, "Updating")),
        UpdateStatus::Finished => Some((StatusIcon::Check, "Update finished")),
        UpdateStatus::Failed => Some((StatusIcon::Cross, "Update failed")),
    }
}

/// What: Project one entry's status onto the rows it affects.
///
/// Inputs:
/// - `run`: Active run.
/// - `index`: Entry position in the run.
///
/// Output:
/// - Row displays: the entry's own row first, then its unselected dependencies,
///   then derived selected entries it depends on. Empty for pending entries or
///   an out-of-range index.
///
/// Details:
/// - All projected rows are disabled for selection.
#[must_use]
pub fn project(run: &UpdateRun, index: usize) -> Vec<RowDisplay> {
    let Some(entry) = run.entries.get(index) else {
        return Vec::new();
    };
    let Some((icon, tooltip)) = affordance(entry.status) else {
        return Vec::new();
    };
    let row = |package: &str, implicit: bool| RowDisplay {
        package: package.to_string(),
        status: entry.status,
        icon,
        tooltip,
        selectable: false,
        checked: true,
        implicit,
    };

    let mut rows = vec![row(&entry.package_name, false)];
    rows.extend(entry.depends_not_selected.iter().map(|d| row(d, true)));
    rows.extend(
        covered_entries(run, index)
            .into_iter()
            .map(|name| row(name, true)),
    );
    rows
}

/// What: Derived selected entries covered by the entry at `index`.
///
/// Output:
/// - Names in discovery order, following dependencies through derived entries so a
///   chain `c -> a -> b` reports both `a` and `b` for `c`.
fn covered_entries(run: &UpdateRun, index: usize) -> Vec<&str> {
    let mut found: Vec<&str> = Vec::new();
    let mut queue = VecDeque::from([index]);
    while let Some(at) = queue.pop_front() {
        for dep in &run.entries[at].dependencies {
            let hit = run.entries.iter().enumerate().find(|(i, e)| {
                *i != index && e.is_dependency_of_selected && &e.package_name == dep
            });
            if let Some((i, e)) = hit
                && !found.contains(&e.package_name.as_str())
            {
                found.push(e.package_name.as_str());
                queue.push_back(i);
            }
        }
    }
    found
}

/// What: Project every entry of the run in order.
///
/// Details:
/// - Later entries overwrite earlier ones when applied to [`RowStates`], matching the
///   order in which statuses were reached.
#[must_use]
pub fn project_run(run: &UpdateRun) -> Vec<RowDisplay> {
    (0..run.entries.len()).flat_map(|i| project(run, i)).collect()
}

/// Latest display per row, kept until the listing is refreshed.
#[derive(Clone, Debug, Default)]
pub struct RowStates {
    rows: BTreeMap<String, RowDisplay>,
}

impl RowStates {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record projected rows, replacing earlier displays of the same rows.
    pub fn apply(&mut self, rows: impl IntoIterator<Item = RowDisplay>) {
        for row in rows {
            self.rows.insert(row.package.clone(), row);
        }
    }

    /// Display for `package`, if any.
    #[must_use]
    pub fn get(&self, package: &str) -> Option<&RowDisplay> {
        self.rows.get(package)
    }

    /// Whether `package` can still be selected.
    #[must_use]
    pub fn is_selectable(&self, package: &str) -> bool {
        self.rows.get(package).is_none_or(|r| r.selectable)
    }

    /// Forget everything; used when the listing is replaced.
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Number of rows with a display.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// `true` when no row has a display.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
