//! Query handlers for the bingo board context.
//!
//! Loading decodes the stored blob; the remaining queries are read-only
//! projections of a session snapshot for the presentation layer.

use bingo_core::error::DomainError;
use bingo_core::repository::SessionRepository;
use serde::Serialize;
use tracing::{debug, warn};

use crate::application::codec::decode_session;
use crate::application::share::parse_share_token;
use crate::domain::model::{GameSession, SessionPhase};

/// One row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    /// The user identifier.
    pub user_id: String,
    /// Display name.
    pub name: String,
    /// Display color.
    pub color: String,
    /// Number of resolutions checked off.
    pub score: usize,
}

/// Read-only view of one board cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardCell {
    /// Position in row-major order.
    pub grid_index: usize,
    /// The occupying resolution, if any.
    pub resolution_id: Option<String>,
    pub text: Option<String>,
    pub note: Option<String>,
    /// Name of the author, when the author is a known user.
    pub author_name: Option<String>,
    /// Color of the author, when the author is a known user.
    pub author_color: Option<String>,
    /// Whether this is the free space.
    pub is_free: bool,
    /// Whether the viewer has this cell checked. The free space always is.
    pub checked: bool,
}

/// Read-only view of a whole board from one viewer's perspective.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardView {
    /// The session identifier.
    pub session_id: String,
    /// Board side length.
    pub grid_size: u32,
    pub phase: SessionPhase,
    /// Cells in row-major order, one per grid index.
    pub cells: Vec<BoardCell>,
    /// Proposal slots still open.
    pub remaining_slots: usize,
}

/// Loads a session by id.
///
/// A blob that fails to decode is reported as absent and logged.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the repository read fails.
pub async fn load_session(
    session_id: &str,
    repo: &dyn SessionRepository,
) -> Result<Option<GameSession>, DomainError> {
    let Some(stored) = repo.load(session_id).await? else {
        debug!(session_id, "no stored session");
        return Ok(None);
    };

    match decode_session(session_id, &stored.payload) {
        Ok(session) => Ok(Some(session)),
        Err(DomainError::CorruptSession { session_id, reason }) => {
            warn!(%session_id, %reason, "ignoring corrupt session blob");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Loads a session by id, treating absence as an error.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound` if no usable session is stored.
/// Returns `DomainError::Infrastructure` if the repository read fails.
pub async fn get_session_by_id(
    session_id: &str,
    repo: &dyn SessionRepository,
) -> Result<GameSession, DomainError> {
    load_session(session_id, repo)
        .await?
        .ok_or_else(|| DomainError::SessionNotFound(session_id.to_owned()))
}

/// Opens the session referenced by a share link, fragment or bare id.
///
/// Returns `None` for a blank token or an unknown session, in which case
/// the caller falls back to asking for an id.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the repository read fails.
pub async fn open_shared_session(
    token: &str,
    repo: &dyn SessionRepository,
) -> Result<Option<GameSession>, DomainError> {
    match parse_share_token(token) {
        Some(session_id) => load_session(&session_id, repo).await,
        None => Ok(None),
    }
}

/// Ranks users by number of checks, highest first. Ties keep join order.
#[must_use]
pub fn leaderboard(session: &GameSession) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = session
        .users
        .iter()
        .map(|u| LeaderboardEntry {
            user_id: u.id.clone(),
            name: u.name.clone(),
            color: u.color.clone(),
            score: session.check_count(&u.id),
        })
        .collect();
    entries.sort_by(|a, b| b.score.cmp(&a.score));
    entries
}

/// Projects the board for `viewer_id`.
#[must_use]
pub fn board_view(session: &GameSession, viewer_id: &str) -> BoardView {
    let cells = (0..session.total_squares())
        .map(|grid_index| match session.resolution_at(grid_index) {
            Some(resolution) => {
                let author = session.user(&resolution.author_id);
                BoardCell {
                    grid_index,
                    resolution_id: Some(resolution.id.clone()),
                    text: Some(resolution.text.clone()),
                    note: resolution.note.clone(),
                    author_name: author.map(|u| u.name.clone()),
                    author_color: author.map(|u| u.color.clone()),
                    is_free: resolution.is_free,
                    checked: session.is_checked(viewer_id, resolution),
                }
            }
            None => BoardCell {
                grid_index,
                resolution_id: None,
                text: None,
                note: None,
                author_name: None,
                author_color: None,
                is_free: false,
                checked: false,
            },
        })
        .collect();

    BoardView {
        session_id: session.id.clone(),
        grid_size: session.grid_size,
        phase: session.phase,
        cells,
        remaining_slots: session.remaining_slots(),
    }
}
