//! Shared application state.

use std::sync::{Arc, Mutex};

use bingo_core::clock::{Clock, SystemClock};
use bingo_core::error::DomainError;
use bingo_core::repository::SessionRepository;
use bingo_core::rng::{DeterministicRng, SystemRng};
use bingo_session::application::peer::SessionPeer;
use bingo_session::domain::commands::CreateSession;
use bingo_store::memory_session_repository::InMemorySessionRepository;
use bingo_store::sqlite_session_repository::SqliteSessionRepository;
use tracing::info;
use uuid::Uuid;

use crate::config::{RuntimeConfig, StoreBackend};
use crate::error::AppError;

/// Application state shared by every peer a presentation layer opens.
#[derive(Clone)]
pub struct AppState {
    /// Clock for session timestamps.
    pub clock: Arc<dyn Clock + Send + Sync>,
    /// RNG for ids, slot assignment and shuffling.
    pub rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    /// Session repository; its change feed links the peers.
    pub session_repository: Arc<dyn SessionRepository>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock + Send + Sync>,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
        session_repository: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            clock,
            rng,
            session_repository,
        }
    }

    /// Builds production state for `config`: the system clock, an
    /// OS-seeded RNG and the configured repository.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the SQLite store cannot be opened.
    pub async fn bootstrap(config: &RuntimeConfig) -> Result<Self, AppError> {
        let session_repository: Arc<dyn SessionRepository> = match config.store {
            StoreBackend::Memory => Arc::new(InMemorySessionRepository::new()),
            StoreBackend::Sqlite => {
                Arc::new(SqliteSessionRepository::connect(&config.database_url).await?)
            }
        };
        info!(store = ?config.store, "session store initialised");

        Ok(Self::new(
            Arc::new(SystemClock),
            Arc::new(Mutex::new(SystemRng::new())),
            session_repository,
        ))
    }

    /// Creates a session and returns a peer acting as its creator.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a bad setup, or the persistence
    /// error if the write fails.
    pub async fn create_session(
        &self,
        name: &str,
        total_users: u32,
        creator_name: &str,
    ) -> Result<SessionPeer, DomainError> {
        let command = CreateSession {
            correlation_id: Uuid::new_v4(),
            name: name.to_owned(),
            total_users,
            creator_name: creator_name.to_owned(),
        };
        SessionPeer::create(
            &command,
            self.clock.as_ref(),
            Arc::clone(&self.rng),
            Arc::clone(&self.session_repository),
        )
        .await
    }

    /// Opens the session referenced by a share link, fragment or bare id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the repository read fails.
    pub async fn open_session(&self, token: &str) -> Result<Option<SessionPeer>, DomainError> {
        SessionPeer::open_shared(
            token,
            Arc::clone(&self.rng),
            Arc::clone(&self.session_repository),
        )
        .await
    }
}
