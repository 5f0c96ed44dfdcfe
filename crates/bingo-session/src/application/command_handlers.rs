//! Command handlers for the bingo board context.
//!
//! Each handler runs one engine transformation against the caller's current
//! snapshot and persists the result, which also announces it on the change
//! feed. When the engine hands the session back unchanged nothing is written.

use std::sync::{Mutex, MutexGuard};

use bingo_core::clock::Clock;
use bingo_core::command::Command;
use bingo_core::error::DomainError;
use bingo_core::repository::SessionRepository;
use bingo_core::rng::DeterministicRng;
use tracing::{debug, info};
use uuid::Uuid;

use crate::application::codec::encode_session;
use crate::domain::commands::{
    AddBackgroundElement, AddResolution, ClearBackground, CreateSession, FinalizeBoard,
    JoinSession, RevertToEdit, ToggleCheck, UpdateBackground, UpdateResolutionNote,
};
use crate::domain::engine;
use crate::domain::model::GameSession;

/// Serializes `session` and writes it as `writer_id`.
///
/// # Errors
///
/// Returns `DomainError` if serialization or the write fails.
pub async fn save_session(
    session: &GameSession,
    repo: &dyn SessionRepository,
    writer_id: Uuid,
) -> Result<(), DomainError> {
    let stored = encode_session(session)?;
    repo.save(&stored, writer_id).await
}

async fn commit(
    command: &dyn Command,
    before: &GameSession,
    after: GameSession,
    repo: &dyn SessionRepository,
    writer_id: Uuid,
) -> Result<GameSession, DomainError> {
    if after == *before {
        debug!(
            command_type = command.command_type(),
            correlation_id = %command.correlation_id(),
            session_id = %before.id,
            "command left session unchanged; nothing persisted"
        );
        return Ok(after);
    }

    save_session(&after, repo, writer_id).await?;
    info!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        session_id = %after.id,
        phase = ?after.phase,
        "session persisted"
    );
    Ok(after)
}

/// Locks the shared RNG, mapping poisoning to `DomainError::Infrastructure`.
pub(crate) fn lock_rng<'a, 'b>(
    rng: &'a Mutex<dyn DeterministicRng + Send + 'b>,
) -> Result<MutexGuard<'a, dyn DeterministicRng + Send + 'b>, DomainError> {
    rng.lock()
        .map_err(|e| DomainError::Infrastructure(format!("RNG mutex poisoned: {e}")))
}

/// Handles `CreateSession`: validates the setup, builds the session and
/// persists it.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a bad setup, or the persistence
/// error if the write fails.
pub async fn handle_create_session(
    command: &CreateSession,
    clock: &dyn Clock,
    rng: &Mutex<dyn DeterministicRng + Send>,
    repo: &dyn SessionRepository,
    writer_id: Uuid,
) -> Result<GameSession, DomainError> {
    engine::validate_setup(&command.name, &command.creator_name, command.total_users)?;

    // Lock RNG only for the synchronous engine call, never across an await.
    let session = {
        let mut rng_guard = lock_rng(rng)?;
        engine::create_session(
            &command.name,
            command.total_users,
            &command.creator_name,
            clock,
            &mut *rng_guard,
        )
    };

    save_session(&session, repo, writer_id).await?;
    info!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id,
        session_id = %session.id,
        grid_size = session.grid_size,
        "session created"
    );
    Ok(session)
}

/// Handles `JoinSession`. The name is trimmed; a blank name, or rejoining
/// under an existing name, writes nothing.
///
/// # Errors
///
/// Returns `DomainError` if persistence fails.
pub async fn handle_join_session(
    command: &JoinSession,
    session: &GameSession,
    rng: &Mutex<dyn DeterministicRng + Send>,
    repo: &dyn SessionRepository,
    writer_id: Uuid,
) -> Result<GameSession, DomainError> {
    let user_name = command.user_name.trim();
    let next = if user_name.is_empty() {
        session.clone()
    } else {
        let mut rng_guard = lock_rng(rng)?;
        engine::join_session(session, user_name, &mut *rng_guard)
    };
    commit(command, session, next, repo, writer_id).await
}

/// Handles `AddResolution`. Text and note are trimmed; blank text is
/// ignored and a blank note is stored as absent.
///
/// # Errors
///
/// Returns `DomainError` if persistence fails.
pub async fn handle_add_resolution(
    command: &AddResolution,
    session: &GameSession,
    rng: &Mutex<dyn DeterministicRng + Send>,
    repo: &dyn SessionRepository,
    writer_id: Uuid,
) -> Result<GameSession, DomainError> {
    let text = command.text.trim();
    let note = command
        .note
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let next = if text.is_empty() {
        session.clone()
    } else {
        let mut rng_guard = lock_rng(rng)?;
        engine::add_resolution(session, text, &command.author_id, note, &mut *rng_guard)
    };
    commit(command, session, next, repo, writer_id).await
}

/// Handles `UpdateResolutionNote`.
///
/// # Errors
///
/// Returns `DomainError` if persistence fails.
pub async fn handle_update_resolution_note(
    command: &UpdateResolutionNote,
    session: &GameSession,
    repo: &dyn SessionRepository,
    writer_id: Uuid,
) -> Result<GameSession, DomainError> {
    let next = engine::update_resolution_note(session, &command.resolution_id, &command.note);
    commit(command, session, next, repo, writer_id).await
}

/// Handles `ToggleCheck`.
///
/// # Errors
///
/// Returns `DomainError` if persistence fails.
pub async fn handle_toggle_check(
    command: &ToggleCheck,
    session: &GameSession,
    repo: &dyn SessionRepository,
    writer_id: Uuid,
) -> Result<GameSession, DomainError> {
    let next = engine::toggle_check(session, &command.user_id, &command.resolution_id);
    commit(command, session, next, repo, writer_id).await
}

/// Handles `UpdateBackground`.
///
/// # Errors
///
/// Returns `DomainError` if persistence fails.
pub async fn handle_update_background(
    command: &UpdateBackground,
    session: &GameSession,
    repo: &dyn SessionRepository,
    writer_id: Uuid,
) -> Result<GameSession, DomainError> {
    let next = engine::update_background(session, command.elements.clone());
    commit(command, session, next, repo, writer_id).await
}

/// Handles `AddBackgroundElement`.
///
/// # Errors
///
/// Returns `DomainError` if persistence fails.
pub async fn handle_add_background_element(
    command: &AddBackgroundElement,
    session: &GameSession,
    repo: &dyn SessionRepository,
    writer_id: Uuid,
) -> Result<GameSession, DomainError> {
    let next = engine::append_background_element(session, command.element.clone());
    commit(command, session, next, repo, writer_id).await
}

/// Handles `ClearBackground`.
///
/// # Errors
///
/// Returns `DomainError` if persistence fails.
pub async fn handle_clear_background(
    command: &ClearBackground,
    session: &GameSession,
    repo: &dyn SessionRepository,
    writer_id: Uuid,
) -> Result<GameSession, DomainError> {
    let next = engine::clear_background(session);
    commit(command, session, next, repo, writer_id).await
}

/// Handles `FinalizeBoard`: shuffles the proposals onto the board.
///
/// # Errors
///
/// Returns `DomainError` if persistence fails.
pub async fn handle_finalize_board(
    command: &FinalizeBoard,
    session: &GameSession,
    rng: &Mutex<dyn DeterministicRng + Send>,
    repo: &dyn SessionRepository,
    writer_id: Uuid,
) -> Result<GameSession, DomainError> {
    let next = {
        let mut rng_guard = lock_rng(rng)?;
        engine::finalize_board(session, &mut *rng_guard)
    };
    commit(command, session, next, repo, writer_id).await
}

/// Handles `RevertToEdit`.
///
/// # Errors
///
/// Returns `DomainError` if persistence fails.
pub async fn handle_revert_to_edit(
    command: &RevertToEdit,
    session: &GameSession,
    repo: &dyn SessionRepository,
    writer_id: Uuid,
) -> Result<GameSession, DomainError> {
    let next = engine::revert_to_edit(session);
    commit(command, session, next, repo, writer_id).await
}
