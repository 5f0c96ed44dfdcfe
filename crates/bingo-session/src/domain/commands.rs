//! Commands for the bingo board context.
//!
//! One command per user intent the presentation layer can forward.

use bingo_core::command::Command;
use uuid::Uuid;

use super::model::CanvasElement;

/// Command to create a new session with its creator as the first user.
#[derive(Debug, Clone)]
pub struct CreateSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Session display name.
    pub name: String,
    /// Expected number of players; sizes the grid.
    pub total_users: u32,
    /// Display name of the creator.
    pub creator_name: String,
}

impl Command for CreateSession {
    fn command_type(&self) -> &'static str {
        "bingo.create_session"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to join (or rejoin) a session under a display name.
#[derive(Debug, Clone)]
pub struct JoinSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Display name; matched case-insensitively against existing users.
    pub user_name: String,
}

impl Command for JoinSession {
    fn command_type(&self) -> &'static str {
        "bingo.join_session"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to propose a resolution.
#[derive(Debug, Clone)]
pub struct AddResolution {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Goal text.
    pub text: String,
    /// Proposing user.
    pub author_id: String,
    /// Optional detail.
    pub note: Option<String>,
}

impl Command for AddResolution {
    fn command_type(&self) -> &'static str {
        "bingo.add_resolution"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to replace the note on a resolution.
#[derive(Debug, Clone)]
pub struct UpdateResolutionNote {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Target resolution.
    pub resolution_id: String,
    /// Replacement note.
    pub note: String,
}

impl Command for UpdateResolutionNote {
    fn command_type(&self) -> &'static str {
        "bingo.update_resolution_note"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to check or uncheck a resolution for a user.
#[derive(Debug, Clone)]
pub struct ToggleCheck {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The user whose checks change.
    pub user_id: String,
    /// The resolution to flip.
    pub resolution_id: String,
}

impl Command for ToggleCheck {
    fn command_type(&self) -> &'static str {
        "bingo.toggle_check"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to replace the whole background element list.
#[derive(Debug, Clone)]
pub struct UpdateBackground {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The new element list.
    pub elements: Vec<CanvasElement>,
}

impl Command for UpdateBackground {
    fn command_type(&self) -> &'static str {
        "bingo.update_background"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to append one element to the background.
#[derive(Debug, Clone)]
pub struct AddBackgroundElement {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The element to append.
    pub element: CanvasElement,
}

impl Command for AddBackgroundElement {
    fn command_type(&self) -> &'static str {
        "bingo.add_background_element"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to erase the background.
#[derive(Debug, Clone)]
pub struct ClearBackground {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for ClearBackground {
    fn command_type(&self) -> &'static str {
        "bingo.clear_background"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to lock the board (EDIT → PLAY).
#[derive(Debug, Clone)]
pub struct FinalizeBoard {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for FinalizeBoard {
    fn command_type(&self) -> &'static str {
        "bingo.finalize_board"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to unlock the board (PLAY → EDIT).
#[derive(Debug, Clone)]
pub struct RevertToEdit {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for RevertToEdit {
    fn command_type(&self) -> &'static str {
        "bingo.revert_to_edit"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
