//! Session peers.
//!
//! A [`SessionPeer`] is one open view of a session: it owns a writer id, the
//! local snapshot, the identity of the user acting through it, and a
//! subscription to other writers' changes. Local commands replace the
//! snapshot directly; remote changes replace it wholesale, so the last
//! writer wins.

use std::sync::{Arc, Mutex};

use bingo_core::clock::Clock;
use bingo_core::error::DomainError;
use bingo_core::notification::{SessionChange, SessionSubscription};
use bingo_core::repository::SessionRepository;
use bingo_core::rng::DeterministicRng;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::codec::decode_session;
use crate::application::command_handlers;
use crate::application::query_handlers;
use crate::application::share::{parse_share_token, share_link};
use crate::domain::commands::{
    AddBackgroundElement, AddResolution, ClearBackground, CreateSession, FinalizeBoard,
    JoinSession, RevertToEdit, ToggleCheck, UpdateBackground, UpdateResolutionNote,
};
use crate::domain::model::{CanvasElement, GameSession, Point, User};

/// Message returned when joining without a name.
pub const NAME_REQUIRED_MESSAGE: &str = "Enter a name to join.";
/// Message returned when acting before joining.
pub const JOIN_REQUIRED_MESSAGE: &str = "Join the session first.";

/// One observer's live handle on a session.
pub struct SessionPeer {
    writer_id: Uuid,
    repo: Arc<dyn SessionRepository>,
    rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    session: GameSession,
    current_user_id: Option<String>,
    subscription: SessionSubscription,
}

impl std::fmt::Debug for SessionPeer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionPeer")
            .field("writer_id", &self.writer_id)
            .field("session_id", &self.session.id)
            .field("current_user_id", &self.current_user_id)
            .finish_non_exhaustive()
    }
}

impl SessionPeer {
    /// Creates a session and returns a peer acting as its creator.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a bad setup, or the persistence
    /// error if the write fails.
    pub async fn create(
        command: &CreateSession,
        clock: &dyn Clock,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
        repo: Arc<dyn SessionRepository>,
    ) -> Result<Self, DomainError> {
        let writer_id = Uuid::new_v4();
        let session = command_handlers::handle_create_session(
            command,
            clock,
            rng.as_ref(),
            repo.as_ref(),
            writer_id,
        )
        .await?;

        let subscription = repo.subscribe(&session.id, writer_id);
        let current_user_id = session.users.first().map(|u| u.id.clone());
        Ok(Self {
            writer_id,
            repo,
            rng,
            session,
            current_user_id,
            subscription,
        })
    }

    /// Opens an existing session. Returns `None` if it is absent or its
    /// stored blob is unusable.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the repository read fails.
    pub async fn open(
        session_id: &str,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
        repo: Arc<dyn SessionRepository>,
    ) -> Result<Option<Self>, DomainError> {
        let writer_id = Uuid::new_v4();
        // Subscribe before reading so no write between the two is missed.
        let subscription = repo.subscribe(session_id, writer_id);
        let Some(session) = query_handlers::load_session(session_id, repo.as_ref()).await? else {
            return Ok(None);
        };

        debug!(%writer_id, session_id, "peer opened session");
        Ok(Some(Self {
            writer_id,
            repo,
            rng,
            session,
            current_user_id: None,
            subscription,
        }))
    }

    /// Opens the session referenced by a share link, fragment or bare id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the repository read fails.
    pub async fn open_shared(
        token: &str,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
        repo: Arc<dyn SessionRepository>,
    ) -> Result<Option<Self>, DomainError> {
        match parse_share_token(token) {
            Some(session_id) => Self::open(&session_id, rng, repo).await,
            None => Ok(None),
        }
    }

    /// The id this peer's writes are attributed to.
    #[must_use]
    pub fn writer_id(&self) -> Uuid {
        self.writer_id
    }

    /// The local snapshot.
    #[must_use]
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// The user acting through this peer, once created or joined.
    #[must_use]
    pub fn current_user(&self) -> Option<&User> {
        self.current_user_id
            .as_deref()
            .and_then(|id| self.session.user(id))
    }

    /// Share link for this peer's session.
    #[must_use]
    pub fn share_link(&self, base_url: &str) -> String {
        share_link(base_url, &self.session.id)
    }

    /// Joins under `name`, or resumes as the existing user with that name
    /// (case-insensitive), and acts as that user from then on.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a blank name, or the persistence
    /// error if the write fails.
    pub async fn join(&mut self, name: &str) -> Result<User, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::Validation(NAME_REQUIRED_MESSAGE.to_owned()));
        }

        let command = JoinSession {
            correlation_id: Uuid::new_v4(),
            user_name: name.to_owned(),
        };
        self.session = command_handlers::handle_join_session(
            &command,
            &self.session,
            self.rng.as_ref(),
            self.repo.as_ref(),
            self.writer_id,
        )
        .await?;

        let user = self.session.find_user_by_name(name).cloned().ok_or_else(|| {
            DomainError::Infrastructure(format!("user {name} missing after join"))
        })?;
        info!(session_id = %self.session.id, user_id = %user.id, "peer acting as user");
        self.current_user_id = Some(user.id.clone());
        Ok(user)
    }

    fn acting_user_id(&self) -> Result<String, DomainError> {
        self.current_user()
            .map(|u| u.id.clone())
            .ok_or_else(|| DomainError::Validation(JOIN_REQUIRED_MESSAGE.to_owned()))
    }

    /// Proposes a resolution authored by the current user.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` before joining, or the persistence
    /// error if the write fails.
    pub async fn add_resolution(
        &mut self,
        text: &str,
        note: Option<&str>,
    ) -> Result<&GameSession, DomainError> {
        let command = AddResolution {
            correlation_id: Uuid::new_v4(),
            text: text.to_owned(),
            author_id: self.acting_user_id()?,
            note: note.map(str::to_owned),
        };
        self.session = command_handlers::handle_add_resolution(
            &command,
            &self.session,
            self.rng.as_ref(),
            self.repo.as_ref(),
            self.writer_id,
        )
        .await?;
        Ok(&self.session)
    }

    /// Replaces the note on a resolution.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if persistence fails.
    pub async fn update_note(
        &mut self,
        resolution_id: &str,
        note: &str,
    ) -> Result<&GameSession, DomainError> {
        let command = UpdateResolutionNote {
            correlation_id: Uuid::new_v4(),
            resolution_id: resolution_id.to_owned(),
            note: note.to_owned(),
        };
        self.session = command_handlers::handle_update_resolution_note(
            &command,
            &self.session,
            self.repo.as_ref(),
            self.writer_id,
        )
        .await?;
        Ok(&self.session)
    }

    /// Checks or unchecks a resolution for the current user.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` before joining, or the persistence
    /// error if the write fails.
    pub async fn toggle_check(&mut self, resolution_id: &str) -> Result<&GameSession, DomainError> {
        let command = ToggleCheck {
            correlation_id: Uuid::new_v4(),
            user_id: self.acting_user_id()?,
            resolution_id: resolution_id.to_owned(),
        };
        self.session = command_handlers::handle_toggle_check(
            &command,
            &self.session,
            self.repo.as_ref(),
            self.writer_id,
        )
        .await?;
        Ok(&self.session)
    }

    /// Replaces the whole background.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if persistence fails.
    pub async fn update_background(
        &mut self,
        elements: Vec<CanvasElement>,
    ) -> Result<&GameSession, DomainError> {
        let command = UpdateBackground {
            correlation_id: Uuid::new_v4(),
            elements,
        };
        self.session = command_handlers::handle_update_background(
            &command,
            &self.session,
            self.repo.as_ref(),
            self.writer_id,
        )
        .await?;
        Ok(&self.session)
    }

    /// Appends one background element.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if persistence fails.
    pub async fn add_background_element(
        &mut self,
        element: CanvasElement,
    ) -> Result<&GameSession, DomainError> {
        let command = AddBackgroundElement {
            correlation_id: Uuid::new_v4(),
            element,
        };
        self.session = command_handlers::handle_add_background_element(
            &command,
            &self.session,
            self.repo.as_ref(),
            self.writer_id,
        )
        .await?;
        Ok(&self.session)
    }

    /// Draws a freehand stroke as the current user.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` before joining, or the persistence
    /// error if the write fails.
    pub async fn draw_path(
        &mut self,
        points: Vec<Point>,
        color: &str,
        brush_size: f64,
    ) -> Result<&GameSession, DomainError> {
        let author_id = self.acting_user_id()?;
        let element = {
            let mut rng_guard = command_handlers::lock_rng(&self.rng)?;
            CanvasElement::path(points, color, brush_size, &author_id, &mut *rng_guard)
        };
        self.add_background_element(element).await
    }

    /// Places a text label as the current user.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` before joining, or the persistence
    /// error if the write fails.
    pub async fn place_text(
        &mut self,
        position: Point,
        content: &str,
        color: &str,
    ) -> Result<&GameSession, DomainError> {
        let author_id = self.acting_user_id()?;
        let element = {
            let mut rng_guard = command_handlers::lock_rng(&self.rng)?;
            CanvasElement::text(position, content, color, &author_id, &mut *rng_guard)
        };
        self.add_background_element(element).await
    }

    /// Places an image (URL or data URL) as the current user.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` before joining, or the persistence
    /// error if the write fails.
    pub async fn place_image(
        &mut self,
        position: Point,
        source: &str,
    ) -> Result<&GameSession, DomainError> {
        let author_id = self.acting_user_id()?;
        let element = {
            let mut rng_guard = command_handlers::lock_rng(&self.rng)?;
            CanvasElement::image(position, source, &author_id, &mut *rng_guard)
        };
        self.add_background_element(element).await
    }

    /// Erases the background.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if persistence fails.
    pub async fn clear_background(&mut self) -> Result<&GameSession, DomainError> {
        let command = ClearBackground {
            correlation_id: Uuid::new_v4(),
        };
        self.session = command_handlers::handle_clear_background(
            &command,
            &self.session,
            self.repo.as_ref(),
            self.writer_id,
        )
        .await?;
        Ok(&self.session)
    }

    /// Locks the board and starts play.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if persistence fails.
    pub async fn finalize(&mut self) -> Result<&GameSession, DomainError> {
        let command = FinalizeBoard {
            correlation_id: Uuid::new_v4(),
        };
        self.session = command_handlers::handle_finalize_board(
            &command,
            &self.session,
            self.rng.as_ref(),
            self.repo.as_ref(),
            self.writer_id,
        )
        .await?;
        Ok(&self.session)
    }

    /// Unlocks the board for editing.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if persistence fails.
    pub async fn revert(&mut self) -> Result<&GameSession, DomainError> {
        let command = RevertToEdit {
            correlation_id: Uuid::new_v4(),
        };
        self.session = command_handlers::handle_revert_to_edit(
            &command,
            &self.session,
            self.repo.as_ref(),
            self.writer_id,
        )
        .await?;
        Ok(&self.session)
    }

    /// Replaces the snapshot with a changed session written elsewhere.
    ///
    /// Returns `false`, keeping the current snapshot, if the change belongs
    /// to another session or its payload does not decode.
    pub fn apply_change(&mut self, change: &SessionChange) -> bool {
        if change.session_id != self.session.id {
            return false;
        }
        match decode_session(&change.session_id, &change.new_value) {
            Ok(session) => {
                debug!(
                    session_id = %session.id,
                    writer_id = %change.writer_id,
                    "applied remote session change"
                );
                self.session = session;
                true
            }
            Err(e) => {
                warn!(session_id = %change.session_id, error = %e, "ignoring undecodable change");
                false
            }
        }
    }

    /// Waits for another writer's change and applies it. If several are
    /// already queued, only the newest is applied.
    ///
    /// Returns `None` once the change feed has shut down.
    pub async fn next_remote_update(&mut self) -> Option<GameSession> {
        loop {
            let mut latest = self.subscription.recv().await?;
            while let Some(newer) = self.subscription.try_recv() {
                latest = newer;
            }
            if self.apply_change(&latest) {
                return Some(self.session.clone());
            }
        }
    }

    /// Applies the newest pending change from another writer, if any,
    /// without waiting. Returns whether the snapshot changed.
    pub fn try_remote_update(&mut self) -> bool {
        let mut latest = None;
        while let Some(change) = self.subscription.try_recv() {
            latest = Some(change);
        }
        latest.is_some_and(|change| self.apply_change(&change))
    }
}
