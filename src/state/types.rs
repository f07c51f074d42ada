//! Core value types for update runs.

use serde::{Deserialize, Serialize};

/// One row of the "available updates" listing.
///
/// Built from a `listSoftwareUpdates` response and replaced wholesale on
/// every re-list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCandidate {
    /// Package name, unique within one listing.
    pub package_name: String,
    /// Version offered by the repository.
    #[serde(default)]
    pub version: String,
    /// Target architecture.
    #[serde(default)]
    pub arch: String,
    /// Repository the update comes from.
    #[serde(default)]
    pub repository: String,
}

/// Progress of a single package inside an update run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateStatus {
    /// Not started yet (also the resting state of derived entries).
    #[default]
    Pending,
    /// Update request in flight.
    Running,
    /// Remote reported success.
    Finished,
    /// Remote reported failure.
    Failed,
}

impl UpdateStatus {
    /// What: Position of the status in the forward-only lifecycle.
    const fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Running => 1,
            Self::Finished | Self::Failed => 2,
        }
    }

    /// Whether the status is `Finished` or `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Failed)
    }

    /// Short lowercase label used in logs and tables.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Finished => "finished",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One package the user marked for update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionEntry {
    /// Name of the referenced [`UpdateCandidate`].
    pub package_name: String,
    /// Current status; only ever moves forward.
    pub status: UpdateStatus,
    /// Dependencies that are listed as candidates but were not selected.
    pub depends_not_selected: Vec<String>,
    /// `true` when another selected package depends on this one.
    pub is_dependency_of_selected: bool,
    /// Set once the entry has been used as a source in the derivation pass.
    pub visited: bool,
    /// Full dependency list as fetched from the remote.
    pub dependencies: Vec<String>,
}

impl SelectionEntry {
    /// What: Create a pending entry with no dependency data.
    ///
    /// Inputs:
    /// - `package_name`: Selected package name.
    ///
    /// Output:
    /// - Fresh `SelectionEntry` in `Pending` state.
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            status: UpdateStatus::Pending,
            depends_not_selected: Vec::new(),
            is_dependency_of_selected: false,
            visited: false,
            dependencies: Vec::new(),
        }
    }

    /// What: Move the entry to `next` if that is a forward transition.
    ///
    /// Inputs:
    /// - `next`: Requested status.
    ///
    /// Output:
    /// - `true` when the status changed, `false` when the transition was refused.
    ///
    /// Details:
    /// - Terminal states are final; a second terminal status is refused as well.
    pub fn advance_to(&mut self, next: UpdateStatus) -> bool {
        if next.rank() <= self.status.rank() {
            tracing::debug!(
                package = %self.package_name,
                from = %self.status,
                to = %next,
                "refusing backward status transition"
            );
            return false;
        }
        self.status = next;
        true
    }
}

/// The ordered selection plus cursor and transcript of one update run.
#[derive(Clone, Debug, Default)]
pub struct UpdateRun {
    /// Entries in execution order.
    pub entries: Vec<SelectionEntry>,
    /// Index of the next entry to process.
    pub cursor: usize,
    /// Append-only progress transcript.
    log: Vec<String>,
}

impl UpdateRun {
    /// Start a run over `entries` with an empty transcript.
    #[must_use]
    pub const fn new(entries: Vec<SelectionEntry>) -> Self {
        Self {
            entries,
            cursor: 0,
            log: Vec::new(),
        }
    }

    /// `true` once the cursor walked past the last entry.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.cursor >= self.entries.len()
    }

    /// Append a line to the transcript.
    pub fn log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }

    /// Transcript lines in insertion order.
    #[must_use]
    pub fn log_lines(&self) -> &[String] {
        &self.log
    }

    /// Transcript joined with newlines.
    #[must_use]
    pub fn transcript(&self) -> String {
        self.log.join("\n")
    }

    /// Look up an entry by package name.
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&SelectionEntry> {
        self.entries.iter().find(|e| e.package_name == name)
    }

    /// Names of the entries that will receive their own update call.
    #[must_use]
    pub fn applied_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| !e.is_dependency_of_selected)
            .map(|e| e.package_name.as_str())
            .collect()
    }
}
