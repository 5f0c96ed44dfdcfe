//! Change notifications for persisted sessions.
//!
//! Every write to a [`SessionRepository`](crate::repository::SessionRepository)
//! publishes a [`SessionChange`] on a [`ChangeFeed`]. Observers subscribe per
//! session id; a subscription never yields the observer's own writes, so the
//! writer must update its in-memory snapshot directly.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::warn;
use uuid::Uuid;

use crate::repository::session_key;

/// Broadcast whenever a session record is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionChange {
    /// Namespaced storage key of the written record.
    pub key: String,
    /// The session id (key without prefix).
    pub session_id: String,
    /// The full serialized session that was written.
    pub new_value: String,
    /// The observer that performed the write.
    pub writer_id: Uuid,
}

/// Default number of buffered notifications per subscriber.
pub const DEFAULT_FEED_CAPACITY: usize = 64;

/// Fire-and-forget publish/subscribe channel for session writes.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<SessionChange>,
}

impl ChangeFeed {
    /// Creates a feed with [`DEFAULT_FEED_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_FEED_CAPACITY)
    }

    /// Creates a feed buffering up to `capacity` notifications per subscriber.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes a change to all current subscribers and returns how many
    /// receivers it was delivered to. Having no subscribers is not an error.
    pub fn publish(&self, change: SessionChange) -> usize {
        self.sender.send(change).unwrap_or(0)
    }

    /// Subscribes to writes of `session_id` made by anyone but `observer_id`.
    #[must_use]
    pub fn subscribe(&self, session_id: &str, observer_id: Uuid) -> SessionSubscription {
        SessionSubscription {
            receiver: self.sender.subscribe(),
            key: session_key(session_id),
            observer_id,
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// A subscription to one session's writes, excluding the observer's own.
#[derive(Debug)]
pub struct SessionSubscription {
    receiver: broadcast::Receiver<SessionChange>,
    key: String,
    observer_id: Uuid,
}

impl SessionSubscription {
    /// Waits for the next change from another writer.
    ///
    /// Returns `None` once the feed has been dropped. If this subscriber fell
    /// behind, the skipped notifications are dropped and delivery resumes with
    /// the oldest retained one.
    pub async fn recv(&mut self) -> Option<SessionChange> {
        loop {
            match self.receiver.recv().await {
                Ok(change) if self.accepts(&change) => return Some(change),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(key = %self.key, skipped, "session subscription lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next pending change from another writer without waiting.
    pub fn try_recv(&mut self) -> Option<SessionChange> {
        loop {
            match self.receiver.try_recv() {
                Ok(change) if self.accepts(&change) => return Some(change),
                Ok(_) => {}
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(key = %self.key, skipped, "session subscription lagged");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// The storage key this subscription listens on.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    fn accepts(&self, change: &SessionChange) -> bool {
        change.key == self.key && change.writer_id != self.observer_id
    }
}
