//! In-process implementation of the `SessionRepository` trait.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use bingo_core::error::DomainError;
use bingo_core::notification::{ChangeFeed, SessionChange};
use bingo_core::repository::{SESSION_KEY_PREFIX, SessionRepository, StoredSession, session_key};

/// Session repository backed by a map of namespaced keys to blobs.
///
/// Every peer sharing one instance observes the same records and the same
/// change feed.
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    records: RwLock<HashMap<String, String>>,
    feed: ChangeFeed,
}

impl InMemorySessionRepository {
    /// Creates an empty repository with its own change feed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty repository announcing writes on `feed`.
    #[must_use]
    pub fn with_feed(feed: ChangeFeed) -> Self {
        Self {
            records: RwLock::default(),
            feed,
        }
    }

    /// Ids of every stored session, in no particular order.
    pub async fn session_ids(&self) -> Vec<String> {
        self.records
            .read()
            .await
            .keys()
            .filter_map(|key| key.strip_prefix(SESSION_KEY_PREFIX))
            .map(str::to_owned)
            .collect()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn load(&self, session_id: &str) -> Result<Option<StoredSession>, DomainError> {
        let records = self.records.read().await;
        Ok(records
            .get(&session_key(session_id))
            .map(|payload| StoredSession {
                session_id: session_id.to_owned(),
                payload: payload.clone(),
            }))
    }

    async fn save(&self, session: &StoredSession, writer_id: Uuid) -> Result<(), DomainError> {
        let key = session_key(&session.session_id);
        self.records
            .write()
            .await
            .insert(key.clone(), session.payload.clone());

        let delivered = self.feed.publish(SessionChange {
            key,
            session_id: session.session_id.clone(),
            new_value: session.payload.clone(),
            writer_id,
        });
        debug!(session_id = %session.session_id, %writer_id, delivered, "session saved");
        Ok(())
    }

    fn change_feed(&self) -> &ChangeFeed {
        &self.feed
    }
}
