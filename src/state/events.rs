//! Page-level topics for repository changes.
//!
//! Publishers (the repository controller, the add/edit flows) announce a
//! change; subscribers re-list the repositories. Backed by a
//! `tokio::sync::broadcast` channel so every subscriber sees every event.

use tokio::sync::broadcast;

/// Named repository events a page can subscribe to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Topic {
    /// A repository was added.
    RepositoryAdded,
    /// A repository was edited or toggled.
    RepositoryUpdated,
    /// A repository was deleted; carries its id.
    RepositoryDeleted(String),
}

impl Topic {
    /// Stable topic name, matching the panel's event names.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::RepositoryAdded => "repositoryAdded",
            Self::RepositoryUpdated => "repositoryUpdated",
            Self::RepositoryDeleted(_) => "repositoryDeleted",
        }
    }
}

/// Broadcast bus shared by publishers and subscribers of one page.
#[derive(Clone, Debug)]
pub struct TopicBus {
    tx: broadcast::Sender<Topic>,
}

impl Default for TopicBus {
    fn default() -> Self {
        Self::new(32)
    }
}

impl TopicBus {
    /// Create a bus buffering up to `capacity` events per lagging subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// What: Announce a topic to current subscribers.
    ///
    /// Inputs:
    /// - `topic`: Event to publish.
    ///
    /// Details:
    /// - Publishing with no subscribers is not an error; the event is dropped.
    pub fn publish(&self, topic: Topic) {
        let name = topic.name();
        match self.tx.send(topic) {
            Ok(n) => tracing::debug!(topic = name, subscribers = n, "published"),
            Err(_) => tracing::debug!(topic = name, "published with no subscribers"),
        }
    }

    /// Subscribe to all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Topic> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
