//! SQLite implementation of the `SessionRepository` trait.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use bingo_core::error::DomainError;
use bingo_core::notification::{ChangeFeed, SessionChange};
use bingo_core::repository::{SessionRepository, StoredSession, session_key};

use crate::schema::CREATE_SESSIONS_TABLE;

/// SQLite-backed session repository.
///
/// The change feed is in-process: only peers sharing this instance (or its
/// feed) are notified of writes.
#[derive(Debug, Clone)]
pub struct SqliteSessionRepository {
    pool: SqlitePool,
    feed: ChangeFeed,
}

fn infrastructure(context: &str, e: &sqlx::Error) -> DomainError {
    DomainError::Infrastructure(format!("{context}: {e}"))
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

impl SqliteSessionRepository {
    /// Creates a new `SqliteSessionRepository` over an existing pool.
    ///
    /// The schema is not created; call [`Self::migrate`] first on a fresh
    /// database.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_feed(pool, ChangeFeed::new())
    }

    /// Creates a repository announcing writes on `feed`.
    #[must_use]
    pub fn with_feed(pool: SqlitePool, feed: ChangeFeed) -> Self {
        Self { pool, feed }
    }

    /// Connects to `database_url` and ensures the schema exists.
    ///
    /// In-memory URLs get a single-connection pool, since every SQLite
    /// connection to `:memory:` opens its own empty database.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the connection or schema creation fails.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let mut options = SqlitePoolOptions::new();
        if is_in_memory(database_url) {
            options = options.max_connections(1);
        }
        let pool = options.connect(database_url).await?;
        let repo = Self::new(pool);
        repo.migrate().await?;
        info!(database_url, "sqlite session store ready");
        Ok(repo)
    }

    /// Creates the sessions table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the statement fails.
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query(CREATE_SESSIONS_TABLE)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// The underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    async fn load(&self, session_id: &str) -> Result<Option<StoredSession>, DomainError> {
        let row = sqlx::query("SELECT payload FROM game_sessions WHERE session_key = ?")
            .bind(session_key(session_id))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| infrastructure("session load failed", &e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let payload: String = row
            .try_get("payload")
            .map_err(|e| infrastructure("session row decode failed", &e))?;
        Ok(Some(StoredSession {
            session_id: session_id.to_owned(),
            payload,
        }))
    }

    async fn save(&self, session: &StoredSession, writer_id: Uuid) -> Result<(), DomainError> {
        let key = session_key(&session.session_id);
        sqlx::query(
            r"
            INSERT INTO game_sessions (session_key, session_id, payload, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(session_key) DO UPDATE SET
                session_id = excluded.session_id,
                payload    = excluded.payload,
                updated_at = excluded.updated_at
            ",
        )
        .bind(&key)
        .bind(&session.session_id)
        .bind(&session.payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| infrastructure("session save failed", &e))?;

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
