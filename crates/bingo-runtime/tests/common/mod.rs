//! Shared test helpers for runtime integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use bingo_core::clock::Clock;
use bingo_core::rng::{DeterministicRng, SeededRng};
use bingo_runtime::state::AppState;
use bingo_session::application::peer::SessionPeer;
use bingo_store::memory_session_repository::InMemorySessionRepository;
use bingo_test_support::FixedClock;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock + Send + Sync> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Build state over a fresh in-memory repository with a seeded RNG.
pub fn memory_state(seed: u64) -> AppState {
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> =
        Arc::new(Mutex::new(SeededRng::new(seed)));
    AppState::new(
        fixed_clock(),
        rng,
        Arc::new(InMemorySessionRepository::new()),
    )
}

/// Host a "Trip 2025" session for `total_users` players as Ava.
pub async fn host(state: &AppState, total_users: u32) -> SessionPeer {
    state
        .create_session("Trip 2025", total_users, "Ava")
        .await
        .unwrap()
}

/// Open the host's session from its share link and join as `name`.
pub async fn guest(state: &AppState, host: &SessionPeer, name: &str) -> SessionPeer {
    let link = host.share_link("https://bingo.example/");
    let mut peer = state.open_session(&link).await.unwrap().unwrap();
    peer.join(name).await.unwrap();
    peer
}
