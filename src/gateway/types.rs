//! Wire types exchanged with the panel's REST API.

use serde::{Deserialize, Serialize};

/// Repository-management tool family reported by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RepoTool {
    /// yum/dnf style repositories.
    Yum,
    /// apt style sources.
    Deb,
    /// No repository management available.
    #[default]
    None,
}

impl RepoTool {
    /// What: Map the `repo_mngt_tool` capability value onto a tool family.
    ///
    /// Inputs:
    /// - `raw`: Capability string, if present.
    ///
    /// Output:
    /// - `Yum` / `Deb` for known values, `None` for `"None"`, absent or unknown values.
    #[must_use]
    pub fn from_capability(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("yum") => Self::Yum,
            Some(v) if v.eq_ignore_ascii_case("deb") => Self::Deb,
            _ => Self::None,
        }
    }

    /// Lowercase tool name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yum => "yum",
            Self::Deb => "deb",
            Self::None => "none",
        }
    }
}

/// Raw capability document from `host/capabilities`.
#[derive(Clone, Debug, Default, Deserialize)]
struct RawCapabilities {
    #[serde(default)]
    update_tool: bool,
    #[serde(default)]
    repo_mngt_tool: Option<String>,
}

/// Host feature availability gating which sections are shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawCapabilities")]
pub struct Capabilities {
    /// Software updates can be listed and applied.
    pub update_tool: bool,
    /// Repository tool family.
    pub repo_tool: RepoTool,
}

impl From<RawCapabilities> for Capabilities {
    fn from(raw: RawCapabilities) -> Self {
        Self {
            update_tool: raw.update_tool,
            repo_tool: RepoTool::from_capability(raw.repo_mngt_tool.as_deref()),
        }
    }
}

impl Capabilities {
    /// `true` when the repository section should be shown.
    #[must_use]
    pub fn has_repositories(&self) -> bool {
        self.repo_tool != RepoTool::None
    }
}

/// One configured software repository.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    /// Repository identifier.
    pub repo_id: String,
    /// Whether the repository is enabled.
    #[serde(default)]
    pub enabled: bool,
    /// Base URL of the repository.
    #[serde(default)]
    pub baseurl: String,
    /// Tool-specific settings (`display_repo_name`, `dist`, `comps`, ...).
    #[serde(default)]
    pub config: serde_json::Map<String, serde_json::Value>,
}

impl Repository {
    /// What: Read a config field as display text.
    ///
    /// Inputs:
    /// - `key`: Config key, e.g. `dist`.
    ///
    /// Output:
    /// - String values as-is, arrays joined with spaces, other JSON rendered; empty when missing.
    #[must_use]
    pub fn config_text(&self, key: &str) -> String {
        match self.config.get(key) {
            None | Some(serde_json::Value::Null) => String::new(),
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .map(|v| v.as_str().map_or_else(|| v.to_string(), str::to_string))
                .collect::<Vec<_>>()
                .join(" "),
            Some(other) => other.to_string(),
        }
    }
}

/// Body of an add-repository request.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NewRepository {
    /// Identifier (yum) or empty for deb sources.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub repo_id: String,
    /// Base URL.
    pub baseurl: String,
    /// Tool-specific settings.
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub config: serde_json::Map<String, serde_json::Value>,
}

/// Body of an edit-repository request; unset fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RepositoryChanges {
    /// New base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseurl: Option<String>,
    /// Settings to overwrite.
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub config: serde_json::Map<String, serde_json::Value>,
}

impl RepositoryChanges {
    /// `true` when the request would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.baseurl.is_none() && self.config.is_empty()
    }
}
