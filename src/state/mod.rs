//! Run state and page events.
//!
//! Value types describing update candidates, selections and runs, plus the
//! topic bus used to announce repository changes.

pub mod events;
pub mod types;

pub use events::{Topic, TopicBus};
pub use types::{SelectionEntry, UpdateCandidate, UpdateRun, UpdateStatus};

#[cfg(test)]
static TEST_MUTEX: std::sync::OnceLock<std::sync::Mutex<()>> = std::sync::OnceLock::new();

/// Serialises tests that mutate process environment variables.
#[cfg(test)]
pub(crate) fn test_mutex() -> &'static std::sync::Mutex<()> {
    TEST_MUTEX.get_or_init(|| std::sync::Mutex::new(()))
}
