//! Integration tests for `SqliteSessionRepository`.

use bingo_core::error::DomainError;
use bingo_core::repository::{SessionRepository, StoredSession};
use bingo_store::sqlite_session_repository::SqliteSessionRepository;
use sqlx::Row;
use sqlx::sqlite::SqlitePoolOptions;
use uuid::Uuid;

/// Helper to build a `StoredSession`.
fn stored(session_id: &str, payload: &str) -> StoredSession {
    StoredSession {
        session_id: session_id.to_owned(),
        payload: payload.to_owned(),
    }
}

/// A migrated repository over a private in-memory database. A single
/// connection keeps every query on the same database.
async fn memory_repo() -> SqliteSessionRepository {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let repo = SqliteSessionRepository::new(pool);
    repo.migrate().await.unwrap();
    repo
}

// --- load ---

#[tokio::test]
async fn test_load_returns_none_for_unknown_session() {
    let repo = memory_repo().await;

    let loaded = repo.load("missing").await.unwrap();

    assert!(loaded.is_none());
}

// --- save + load ---

#[tokio::test]
async fn test_save_and_load_round_trip() {
    let repo = memory_repo().await;

    repo.save(&stored("abc", r#"{"id":"abc"}"#), Uuid::new_v4())
        .await
        .unwrap();

    let loaded = repo.load("abc").await.unwrap();
    assert_eq!(loaded, Some(stored("abc", r#"{"id":"abc"}"#)));
}

#[tokio::test]
async fn test_save_upserts_under_namespaced_key() {
    let repo = memory_repo().await;
    let writer = Uuid::new_v4();

    repo.save(&stored("abc", "v1"), writer).await.unwrap();
    repo.save(&stored("abc", "v2"), writer).await.unwrap();

    let rows = sqlx::query("SELECT session_key, payload FROM game_sessions")
        .fetch_all(repo.pool())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    let key: String = rows[0].get("session_key");
    let payload: String = rows[0].get("payload");
    assert_eq!(key, "bingo_session_abc");
    assert_eq!(payload, "v2");
}

#[tokio::test]
async fn test_migrate_is_idempotent() {
    let repo = memory_repo().await;

    repo.migrate().await.unwrap();

    assert!(repo.load("abc").await.unwrap().is_none());
}

#[tokio::test]
async fn test_connect_to_memory_url_keeps_one_database() {
    let repo = SqliteSessionRepository::connect("sqlite::memory:")
        .await
        .unwrap();

    repo.save(&stored("abc", r#"{"id":"abc"}"#), Uuid::new_v4())
        .await
        .unwrap();

    assert_eq!(repo.pool().options().get_max_connections(), 1);
    let loaded = repo.load("abc").await.unwrap();
    assert_eq!(loaded, Some(stored("abc", r#"{"id":"abc"}"#)));
}

// --- notifications ---

#[tokio::test]
async fn test_save_notifies_subscribers_except_writer() {
    let repo = memory_repo().await;
    let writer = Uuid::new_v4();
    let mut own = repo.subscribe("abc", writer);
    let mut other = repo.subscribe("abc", Uuid::new_v4());

    repo.save(&stored("abc", "v1"), writer).await.unwrap();

    let change = other.recv().await.unwrap();
    assert_eq!(change.session_id, "abc");
    assert_eq!(change.new_value, "v1");
    assert!(own.try_recv().is_none());
}

// --- durability ---

#[tokio::test]
async fn test_sessions_survive_reconnect() {
    let path = std::env::temp_dir().join(format!("bingo-{}.db", Uuid::new_v4()));
    let url = format!("sqlite://{}?mode=rwc", path.display());

    let first = SqliteSessionRepository::connect(&url).await.unwrap();
    first
        .save(&stored("abc", "persisted"), Uuid::new_v4())
        .await
        .unwrap();
    first.pool().close().await;

    let second = SqliteSessionRepository::connect(&url).await.unwrap();
    let loaded = second.load("abc").await.unwrap();
    second.pool().close().await;
    let _ = std::fs::remove_file(&path);

    assert_eq!(loaded.map(|s| s.payload), Some("persisted".to_owned()));
}

// --- failures ---

#[tokio::test]
async fn test_load_without_schema_is_infrastructure_error() {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let repo = SqliteSessionRepository::new(pool);

    let result = repo.load("abc").await;

    assert!(matches!(result, Err(DomainError::Infrastructure(_))));
}
