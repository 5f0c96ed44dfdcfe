//! Session repository abstraction.
//!
//! A repository is a durable keyed slot per session (`<prefix><sessionId>` →
//! serialized session) plus the [`ChangeFeed`] its writes are announced on.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DomainError;
use crate::notification::{ChangeFeed, SessionSubscription};

/// Namespace prefix for every persisted session key.
pub const SESSION_KEY_PREFIX: &str = "bingo_session_";

/// Returns the storage key for a session id.
#[must_use]
pub fn session_key(session_id: &str) -> String {
    format!("{SESSION_KEY_PREFIX}{session_id}")
}

/// Stored representation of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    /// The session id.
    pub session_id: String,
    /// The serialized session blob.
    pub payload: String,
}

/// Repository trait for reading and writing serialized sessions.
///
/// Writes are whole-object replacements: the last write for a key wins.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Load the stored blob for a session, or `None` if absent.
    async fn load(&self, session_id: &str) -> Result<Option<StoredSession>, DomainError>;

    /// Replace the stored blob for a session and announce the write on the
    /// change feed, attributed to `writer_id`.
    async fn save(&self, session: &StoredSession, writer_id: Uuid) -> Result<(), DomainError>;

    /// The feed this repository announces writes on.
    fn change_feed(&self) -> &ChangeFeed;

    /// Subscribe to writes of `session_id` by anyone other than `observer_id`.
    fn subscribe(&self, session_id: &str, observer_id: Uuid) -> SessionSubscription {
        self.change_feed().subscribe(session_id, observer_id)
    }
}
