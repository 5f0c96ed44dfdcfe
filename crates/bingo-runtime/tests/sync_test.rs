//! Integration tests for multi-peer session synchronization.

mod common;

use bingo_core::repository::StoredSession;
use bingo_runtime::config::{LogFormat, RuntimeConfig, StoreBackend};
use bingo_runtime::state::AppState;
use bingo_session::application::query_handlers::{board_view, leaderboard};
use bingo_session::domain::model::SessionPhase;
use uuid::Uuid;

#[tokio::test]
async fn test_guest_join_reaches_host() {
    let state = common::memory_state(1);
    let mut host = common::host(&state, 4).await;

    let guest = common::guest(&state, &host, "Ben").await;
    let seen = host.next_remote_update().await.unwrap();

    assert_eq!(seen.users.len(), 2);
    assert_eq!(host.session(), guest.session());
}

#[tokio::test]
async fn test_writer_is_not_notified_of_own_change() {
    let state = common::memory_state(2);
    let mut host = common::host(&state, 4).await;

    host.add_resolution("Run a 10k", None).await.unwrap();

    assert!(!host.try_remote_update());
    assert_eq!(host.session().resolutions.len(), 1);
}

#[tokio::test]
async fn test_noop_command_sends_no_notification() {
    let state = common::memory_state(3);
    let mut host = common::host(&state, 4).await;
    let mut guest = common::guest(&state, &host, "Ben").await;

    // A second join under the same name changes nothing.
    guest.join("BEN").await.unwrap();
    guest.revert().await.unwrap();

    assert!(host.try_remote_update());
    assert!(!host.try_remote_update());
}

#[tokio::test]
async fn test_concurrent_writes_last_writer_wins() {
    // Arrange
    let state = common::memory_state(4);
    let mut host = common::host(&state, 4).await;
    let mut guest = common::guest(&state, &host, "Ben").await;
    host.next_remote_update().await.unwrap();

    // Act: both edit the same snapshot without seeing each other.
    host.add_resolution("Learn Rust", None).await.unwrap();
    guest.add_resolution("Learn Go", None).await.unwrap();

    // Assert: the later whole-object write clobbers the earlier one.
    let stored = state
        .session_repository
        .load(&host.session().id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.payload.contains("Learn Go"));
    assert!(!stored.payload.contains("Learn Rust"));

    assert!(host.try_remote_update());
    assert_eq!(host.session(), guest.session());
    assert_eq!(host.session().resolutions.len(), 1);
}

#[tokio::test]
async fn test_corrupt_blob_opens_as_not_found() {
    let state = common::memory_state(5);
    state
        .session_repository
        .save(
            &StoredSession {
                session_id: "broken123".to_owned(),
                payload: r#"{"id":"broken123","grid":"?"}"#.to_owned(),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();

    let peer = state.open_session("#broken123").await.unwrap();

    assert!(peer.is_none());
}

#[tokio::test]
async fn test_unknown_link_opens_as_not_found() {
    let state = common::memory_state(6);

    assert!(state.open_session("https://bingo.example/#nope").await.unwrap().is_none());
    assert!(state.open_session("   ").await.unwrap().is_none());
}

#[tokio::test]
async fn test_full_game_between_two_peers() {
    // Arrange
    let state = common::memory_state(7);
    let mut host = common::host(&state, 4).await;
    let mut guest = common::guest(&state, &host, "Ben").await;
    host.next_remote_update().await.unwrap();
    assert_eq!(host.session().grid_size, 5);

    // Act: fill the board, 12 proposals each, alternating peers.
    for i in 0..12 {
        host.add_resolution(&format!("Ava goal {i}"), None).await.unwrap();
        guest.next_remote_update().await.unwrap();
        guest
            .add_resolution(&format!("Ben goal {i}"), Some("with notes"))
            .await
            .unwrap();
        host.next_remote_update().await.unwrap();
    }
    assert!(host.session().is_board_full());
    host.add_resolution("One too many", None).await.unwrap();
    assert_eq!(host.session().proposal_count(), 24);

    host.finalize().await.unwrap();
    let board = guest.next_remote_update().await.unwrap();

    // Assert: board is locked with the free space at the center.
    assert_eq!(board.phase, SessionPhase::Play);
    let center = board.resolution_at(12).unwrap();
    assert!(center.is_free);
    assert_eq!(
        board.resolutions.iter().filter(|r| r.grid_index.is_some()).count(),
        25
    );

    // Play: Ben checks two cells, Ava one.
    let cells: Vec<String> = (0..3)
        .map(|i| board.resolution_at(i).unwrap().id.clone())
        .collect();
    guest.toggle_check(&cells[0]).await.unwrap();
    guest.toggle_check(&cells[1]).await.unwrap();
    host.next_remote_update().await.unwrap();
    host.toggle_check(&cells[2]).await.unwrap();
    guest.next_remote_update().await.unwrap();

    let ranking = leaderboard(guest.session());
    assert_eq!(ranking[0].name, "Ben");
    assert_eq!(ranking[0].score, 2);
    assert_eq!(ranking[1].score, 1);

    let ben_id = guest.current_user().unwrap().id.clone();
    let view = board_view(guest.session(), &ben_id);
    assert_eq!(view.cells.iter().filter(|c| c.checked).count(), 3);

    // Unlocking keeps the checks and removes the free space.
    host.revert().await.unwrap();
    let reverted = guest.next_remote_update().await.unwrap();
    assert_eq!(reverted.phase, SessionPhase::Edit);
    assert!(reverted.resolutions.iter().all(|r| !r.is_free));
    assert_eq!(reverted.check_count(&ben_id), 2);
}

#[tokio::test]
async fn test_sqlite_backend_syncs_peers() {
    let path = std::env::temp_dir().join(format!("bingo-runtime-{}.db", Uuid::new_v4()));
    let config = RuntimeConfig {
        store: StoreBackend::Sqlite,
        database_url: format!("sqlite://{}?mode=rwc", path.display()),
        log_format: LogFormat::Pretty,
    };
    let state = AppState::bootstrap(&config).await.unwrap();

    let mut host = common::host(&state, 2).await;
    let guest = common::guest(&state, &host, "Ben").await;
    let seen = host.next_remote_update().await.unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(seen, *guest.session());
    assert_eq!(seen.users.len(), 2);
}
