//! The session engine.
//!
//! Every game rule is a pure function from the current session (plus
//! arguments) to the next session. Nothing here mutates its input or performs
//! I/O; persistence is layered on top by the command handlers. Guards never
//! fail loudly: a call that does not apply returns an unchanged copy, so
//! callers detect success by comparing before and after.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use bingo_core::clock::Clock;
use bingo_core::error::DomainError;
use bingo_core::identity::{generate_id, string_to_color};
use bingo_core::rng::DeterministicRng;
use chrono::SubsecRound;

use super::grid::{MAX_TOTAL_USERS, grid_size_for};
use super::model::{CanvasElement, GameSession, Resolution, SessionPhase, User};

/// Message shown when a session is configured without players.
pub const NOT_ENOUGH_USERS_MESSAGE: &str = "Need at least 1 user.";
/// Message shown when a session is configured for more players than a
/// board can hold.
pub const TOO_MANY_USERS_MESSAGE: &str = "At most 100 users.";
/// Message shown when the create form has blank fields.
pub const MISSING_FIELDS_MESSAGE: &str = "Fill in all fields to start.";

/// Validates the player count for a new session.
///
/// # Errors
///
/// Returns `DomainError::Validation` with a user-facing message when
/// `total_users` is zero or above [`MAX_TOTAL_USERS`].
pub fn validate_config(total_users: u32) -> Result<(), DomainError> {
    if total_users < 1 {
        return Err(DomainError::Validation(NOT_ENOUGH_USERS_MESSAGE.to_owned()));
    }
    if total_users > MAX_TOTAL_USERS {
        return Err(DomainError::Validation(TOO_MANY_USERS_MESSAGE.to_owned()));
    }
    Ok(())
}

/// Validates the full create form: player count first, then that neither
/// the session name nor the creator name is blank.
///
/// # Errors
///
/// Returns `DomainError::Validation` with a user-facing message.
pub fn validate_setup(
    session_name: &str,
    creator_name: &str,
    total_users: u32,
) -> Result<(), DomainError> {
    validate_config(total_users)?;
    if session_name.trim().is_empty() || creator_name.trim().is_empty() {
        return Err(DomainError::Validation(MISSING_FIELDS_MESSAGE.to_owned()));
    }
    Ok(())
}

/// Creates a session in the EDIT phase with the creator as its only user.
///
/// Assumes `total_users` already passed [`validate_config`]; a count outside
/// `1..=MAX_TOTAL_USERS` is clamped into that range.
pub fn create_session(
    name: &str,
    total_users: u32,
    creator_name: &str,
    clock: &dyn Clock,
    rng: &mut dyn DeterministicRng,
) -> GameSession {
    let total_users = total_users.clamp(1, MAX_TOTAL_USERS);
    let creator = User {
        id: generate_id(rng),
        name: creator_name.to_owned(),
        color: string_to_color(creator_name),
    };

    GameSession {
        id: generate_id(rng),
        name: name.to_owned(),
        total_users,
        grid_size: grid_size_for(total_users),
        checks: BTreeMap::from([(creator.id.clone(), BTreeSet::new())]),
        users: vec![creator],
        resolutions: Vec::new(),
        phase: SessionPhase::Edit,
        // Persisted timestamps carry millisecond precision.
        created_at: clock.now().trunc_subsecs(3),
        background_elements: Vec::new(),
    }
}

/// Adds a user, unless one with the same name (case-insensitive) exists.
pub fn join_session(
    session: &GameSession,
    user_name: &str,
    rng: &mut dyn DeterministicRng,
) -> GameSession {
    if session.find_user_by_name(user_name).is_some() {
        return session.clone();
    }

    let user = User {
        id: generate_id(rng),
        name: user_name.to_owned(),
        color: string_to_color(user_name),
    };

    let mut next = session.clone();
    next.checks.insert(user.id.clone(), BTreeSet::new());
    next.users.push(user);
    next
}

/// Proposes a resolution at a uniformly random free, non-center cell.
///
/// No-op outside the EDIT phase, when the board already holds
/// `gridSize² − 1` proposals, or when no free cell remains.
pub fn add_resolution(
    session: &GameSession,
    text: &str,
    author_id: &str,
    note: Option<&str>,
    rng: &mut dyn DeterministicRng,
) -> GameSession {
    if session.phase != SessionPhase::Edit || session.is_board_full() {
        return session.clone();
    }

    let available = free_cells(session);
    if available.is_empty() {
        return session.clone();
    }
    let grid_index = available[rng.next_index(available.len())];

    let resolution = Resolution {
        id: generate_id(rng),
        text: text.to_owned(),
        note: note.map(str::to_owned),
        author_id: author_id.to_owned(),
        is_free: false,
        grid_index: Some(grid_index),
    };

    let mut next = session.clone();
    next.resolutions.push(resolution);
    next
}

/// Non-center cells not occupied by any resolution, in ascending order.
fn free_cells(session: &GameSession) -> Vec<usize> {
    let center = session.center_index();
    let occupied: HashSet<usize> = session
        .resolutions
        .iter()
        .filter_map(|r| r.grid_index)
        .collect();
    (0..session.total_squares())
        .filter(|i| *i != center && !occupied.contains(i))
        .collect()
}

/// Replaces the note of the matching resolution. No-op if not found.
pub fn update_resolution_note(
    session: &GameSession,
    resolution_id: &str,
    note: &str,
) -> GameSession {
    let mut next = session.clone();
    if let Some(resolution) = next.resolutions.iter_mut().find(|r| r.id == resolution_id) {
        resolution.note = Some(note.to_owned());
    }
    next
}

/// Flips whether `user_id` has checked `resolution_id`.
///
/// No-op for an unknown user, an unknown resolution, or the free space.
pub fn toggle_check(session: &GameSession, user_id: &str, resolution_id: &str) -> GameSession {
    let checkable = session
        .resolution(resolution_id)
        .is_some_and(|r| !r.is_free);
    if session.user(user_id).is_none() || !checkable {
        return session.clone();
    }

    let mut next = session.clone();
    let checked = next.checks.entry(user_id.to_owned()).or_default();
    if !checked.remove(resolution_id) {
        checked.insert(resolution_id.to_owned());
    }
    next
}

/// Replaces the background element list wholesale.
pub fn update_background(session: &GameSession, elements: Vec<CanvasElement>) -> GameSession {
    let mut next = session.clone();
    next.background_elements = elements;
    next
}

/// Appends one element by replacing the list with `existing + element`.
pub fn append_background_element(session: &GameSession, element: CanvasElement) -> GameSession {
    let mut elements = session.background_elements.clone();
    elements.push(element);
    update_background(session, elements)
}

/// Empties the background.
pub fn clear_background(session: &GameSession) -> GameSession {
    update_background(session, Vec::new())
}

/// Locks the board: EDIT → PLAY.
///
/// User-authored resolutions are shuffled uniformly and laid out in grid
/// order, skipping the center, which receives the free space. With fewer
/// proposals than cells the trailing cells stay empty. No-op outside EDIT.
pub fn finalize_board(session: &GameSession, rng: &mut dyn DeterministicRng) -> GameSession {
    if session.phase != SessionPhase::Edit {
        return session.clone();
    }

    let mut proposals: Vec<Resolution> = session
        .resolutions
        .iter()
        .filter(|r| !r.is_free)
        .cloned()
        .collect();
    shuffle(&mut proposals, rng);

    let center = session.center_index();
    let mut pending = proposals.into_iter();
    let mut laid_out = Vec::with_capacity(session.total_squares());
    for index in 0..session.total_squares() {
        if index == center {
            laid_out.push(Resolution::free_space(center));
        } else if let Some(mut resolution) = pending.next() {
            resolution.grid_index = Some(index);
            laid_out.push(resolution);
        }
    }

    let mut next = session.clone();
    let kept: HashSet<&str> = laid_out.iter().map(|r| r.id.as_str()).collect();
    for checked in next.checks.values_mut() {
        checked.retain(|id| kept.contains(id.as_str()));
    }
    next.resolutions = laid_out;
    next.phase = SessionPhase::Play;
    next
}

/// Unlocks the board: PLAY → EDIT.
///
/// Drops the free space and keeps every proposal at its finalized position.
/// Checks are left as they are. No-op outside PLAY.
pub fn revert_to_edit(session: &GameSession) -> GameSession {
    if session.phase != SessionPhase::Play {
        return session.clone();
    }

    let mut next = session.clone();
    next.resolutions.retain(|r| !r.is_free);
    next.phase = SessionPhase::Edit;
    next
}

/// Fisher–Yates shuffle driven by the injected RNG.
fn shuffle<T>(items: &mut [T], rng: &mut dyn DeterministicRng) {
    for i in (1..items.len()).rev() {
        let j = rng.next_index(i + 1);
        items.swap(i, j);
    }
}
