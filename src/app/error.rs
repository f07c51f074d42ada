//! Errors for page-level run handling.

use std::fmt;

use crate::gateway::GatewayError;

/// What: Failure to prepare or start an update run.
///
/// Details:
/// - `AlreadyRunning` rejects a second run while one is active on the page.
/// - `NothingSelected` means no selected name matched a listed candidate.
/// - `UpdatesUnavailable` means the host reports no update tool.
/// - `Gateway` wraps a failed remote call made while preparing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    /// Another run or system update is active.
    AlreadyRunning,
    /// The selection contains no listed package.
    NothingSelected,
    /// The host has no update tool.
    UpdatesUnavailable,
    /// Remote call failed.
    Gateway(GatewayError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyRunning => write!(f, "an update run is already active"),
            Self::NothingSelected => write!(f, "none of the selected packages has an update"),
            Self::UpdatesUnavailable => write!(f, "software updates are not available on this host"),
            Self::Gateway(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gateway(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GatewayError> for RunError {
    fn from(value: GatewayError) -> Self {
        Self::Gateway(value)
    }
}
