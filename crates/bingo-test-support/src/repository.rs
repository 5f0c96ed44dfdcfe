//! Test repositories — mock `SessionRepository` implementations for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bingo_core::error::DomainError;
use bingo_core::notification::{ChangeFeed, SessionChange};
use bingo_core::repository::{SessionRepository, StoredSession, session_key};
use uuid::Uuid;

/// A session repository that records every `save` call. Loads are served
/// from the latest saved blob per session, optionally pre-seeded. Saves are
/// announced on the change feed like a real backend.
#[derive(Debug, Default)]
pub struct RecordingSessionRepository {
    records: Mutex<HashMap<String, String>>,
    saved: Mutex<Vec<(StoredSession, Uuid)>>,
    feed: ChangeFeed,
}

impl RecordingSessionRepository {
    /// Create an empty recording repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a recording repository that already holds `seed`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_session(seed: StoredSession) -> Self {
        let repo = Self::new();
        repo.records
            .lock()
            .unwrap()
            .insert(seed.session_id, seed.payload);
        repo
    }

    /// Returns a snapshot of all saves with their writer ids.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn saved_sessions(&self) -> Vec<(StoredSession, Uuid)> {
        self.saved.lock().unwrap().clone()
    }

    /// Number of saves recorded so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn save_count(&self) -> usize {
        self.saved.lock().unwrap().len()
    }
}

#[async_trait]
impl SessionRepository for RecordingSessionRepository {
    async fn load(&self, session_id: &str) -> Result<Option<StoredSession>, DomainError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(session_id)
            .map(|payload| StoredSession {
                session_id: session_id.to_owned(),
                payload: payload.clone(),
            }))
    }

    async fn save(&self, session: &StoredSession, writer_id: Uuid) -> Result<(), DomainError> {
        self.records
            .lock()
            .unwrap()
            .insert(session.session_id.clone(), session.payload.clone());
        self.saved
            .lock()
            .unwrap()
            .push((session.clone(), writer_id));
        self.feed.publish(SessionChange {
            key: session_key(&session.session_id),
            session_id: session.session_id.clone(),
            new_value: session.payload.clone(),
            writer_id,
        });
        Ok(())
    }

    fn change_feed(&self) -> &ChangeFeed {
        &self.feed
    }
}

/// A session repository that never finds anything and silently accepts
/// saves. Useful for testing "session not found" scenarios and creation.
#[derive(Debug, Default)]
pub struct EmptySessionRepository {
    feed: ChangeFeed,
}

#[async_trait]
impl SessionRepository for EmptySessionRepository {
    async fn load(&self, _session_id: &str) -> Result<Option<StoredSession>, DomainError> {
        Ok(None)
    }

    async fn save(&self, _session: &StoredSession, _writer_id: Uuid) -> Result<(), DomainError> {
        Ok(())
    }

    fn change_feed(&self) -> &ChangeFeed {
        &self.feed
    }
}

/// A session repository that always returns an infrastructure error. Useful
/// for testing error-handling paths.
#[derive(Debug, Default)]
pub struct FailingSessionRepository {
    feed: ChangeFeed,
}

#[async_trait]
impl SessionRepository for FailingSessionRepository {
    async fn load(&self, _session_id: &str) -> Result<Option<StoredSession>, DomainError> {
        Err(DomainError::Infrastructure("storage unavailable".into()))
    }

    async fn save(&self, _session: &StoredSession, _writer_id: Uuid) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("storage unavailable".into()))
    }

    fn change_feed(&self) -> &ChangeFeed {
        &self.feed
    }
}
