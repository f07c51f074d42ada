//! Client settings.
//!
//! Settings come from `settings.conf` in the config directory (see
//! [`paths`]), then command-line flags override individual values.

pub mod parse;
pub mod paths;

use std::path::Path;
use std::time::Duration;

pub use paths::{config_dir, logs_dir, settings_path};

/// Runtime settings of the client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Panel root URL.
    pub server_url: String,
    /// Pause between update-run steps, in milliseconds.
    pub step_delay_ms: u64,
    /// Interval between remote task polls, in milliseconds.
    pub task_poll_interval_ms: u64,
    /// Per-request timeout, in seconds.
    pub request_timeout_secs: u64,
    /// Default tracing filter.
    pub log_level: String,
    /// Skip confirmation prompts.
    pub assume_yes: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "https://localhost:8001".to_string(),
            step_delay_ms: 1000,
            task_poll_interval_ms: 1000,
            request_timeout_secs: 30,
            log_level: "info".to_string(),
            assume_yes: false,
        }
    }
}

impl Settings {
    /// What: Load settings from the default `settings.conf`.
    ///
    /// Output:
    /// - Defaults overlaid with the file's values; plain defaults when the file is missing.
    #[must_use]
    pub fn load() -> Self {
        Self::load_from(&settings_path())
    }

    /// What: Load settings from `path`.
    ///
    /// Inputs:
    /// - `path`: settings file location.
    ///
    /// Output:
    /// - Parsed settings; defaults when the file cannot be read.
    ///
    /// Details:
    /// - Unreadable files and unknown keys are logged, never fatal.
    #[must_use]
    pub fn load_from(path: &Path) -> Self {
        let mut settings = Self::default();
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let unknown = parse::parse_settings(&content, &mut settings);
                for key in unknown {
                    tracing::warn!(key = %key, path = %path.display(), "unknown settings key");
                }
                tracing::debug!(path = %path.display(), "settings loaded");
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "settings file not read; using defaults");
            }
        }
        settings
    }

    /// Pause between run steps.
    #[must_use]
    pub const fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    /// Interval between task polls.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.task_poll_interval_ms)
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
