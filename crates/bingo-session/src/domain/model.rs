//! Session data model.
//!
//! Field names serialize in camelCase so a persisted blob reads the same as
//! the board's shared storage format (`totalUsers`, `gridIndex`, ...).

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::grid;

/// Fixed id of the synthetic center resolution.
pub const FREE_SPACE_ID: &str = "FREE";
/// Text shown on the free space.
pub const FREE_SPACE_TEXT: &str = "FREE";
/// Sentinel author of the free space.
pub const SYSTEM_AUTHOR_ID: &str = "SYSTEM";

/// A participant, identified by a self-declared display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque id minted at join time.
    pub id: String,
    /// Display name.
    pub name: String,
    /// `#RRGGBB` color derived from the name.
    pub color: String,
}

/// A proposed goal occupying one grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub author_id: String,
    /// Marks the synthetic center cell.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_free: bool,
    /// 0-based position in the flattened board.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_index: Option<usize>,
}

impl Resolution {
    /// The free space resolution placed at `center`.
    #[must_use]
    pub fn free_space(center: usize) -> Self {
        Self {
            id: FREE_SPACE_ID.to_owned(),
            text: FREE_SPACE_TEXT.to_owned(),
            note: None,
            author_id: SYSTEM_AUTHOR_ID.to_owned(),
            is_free: true,
            grid_index: Some(center),
        }
    }
}

/// Session phase. `Edit` collects goals; `Play` locks the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionPhase {
    Edit,
    Play,
}

/// Kind of background decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Path,
    Text,
    Image,
}

/// A 2D point of a freehand stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// One decoration on the shared background canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasElement {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementType,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brush_size: Option<f64>,
    /// Text content, or an image URL / data URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Point>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    pub author_id: String,
}

/// The shared game instance: the aggregate every engine operation replaces
/// wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub id: String,
    pub name: String,
    pub total_users: u32,
    /// Board side length, fixed at creation.
    pub grid_size: u32,
    pub users: Vec<User>,
    pub resolutions: Vec<Resolution>,
    /// Resolution ids each user has checked off. The free space is never
    /// listed; it counts as checked for everyone.
    pub checks: BTreeMap<String, BTreeSet<String>>,
    pub phase: SessionPhase,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub background_elements: Vec<CanvasElement>,
}

impl GameSession {
    /// Number of cells on the board.
    #[must_use]
    pub fn total_squares(&self) -> usize {
        grid::total_squares(self.grid_size)
    }

    /// Index of the free space cell.
    #[must_use]
    pub fn center_index(&self) -> usize {
        grid::center_index(self.grid_size)
    }

    /// How many user-authored resolutions the board can hold.
    #[must_use]
    pub fn max_resolutions(&self) -> usize {
        self.total_squares() - 1
    }

    /// Number of user-authored resolutions.
    #[must_use]
    pub fn proposal_count(&self) -> usize {
        self.resolutions.iter().filter(|r| !r.is_free).count()
    }

    /// Cells still open for proposals.
    #[must_use]
    pub fn remaining_slots(&self) -> usize {
        self.max_resolutions().saturating_sub(self.proposal_count())
    }

    #[must_use]
    pub fn is_board_full(&self) -> bool {
        self.remaining_slots() == 0
    }

    #[must_use]
    pub fn user(&self, user_id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == user_id)
    }

    /// Case-insensitive lookup by display name.
    #[must_use]
    pub fn find_user_by_name(&self, name: &str) -> Option<&User> {
        let wanted = name.to_lowercase();
        self.users.iter().find(|u| u.name.to_lowercase() == wanted)
    }

    #[must_use]
    pub fn resolution(&self, resolution_id: &str) -> Option<&Resolution> {
        self.resolutions.iter().find(|r| r.id == resolution_id)
    }

    /// The resolution occupying `grid_index`, if any.
    #[must_use]
    pub fn resolution_at(&self, grid_index: usize) -> Option<&Resolution> {
        self.resolutions
            .iter()
            .find(|r| r.grid_index == Some(grid_index))
    }

    /// Whether `user_id` has `resolution` checked. The free space always is.
    #[must_use]
    pub fn is_checked(&self, user_id: &str, resolution: &Resolution) -> bool {
        resolution.is_free
            || self
                .checks
                .get(user_id)
                .is_some_and(|checked| checked.contains(&resolution.id))
    }

    /// Number of resolutions `user_id` has checked off.
    #[must_use]
    pub fn check_count(&self, user_id: &str) -> usize {
        self.checks.get(user_id).map_or(0, BTreeSet::len)
    }

    /// Checks the structural rules a persisted session must satisfy.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated rule.
    pub fn validate_shape(&self) -> Result<(), String> {
        if !(1..=grid::MAX_TOTAL_USERS).contains(&self.total_users) {
            return Err(format!("unsupported user count {}", self.total_users));
        }
        if self.grid_size < grid::MIN_GRID_SIZE || self.grid_size % 2 == 0 {
            return Err(format!("invalid grid size {}", self.grid_size));
        }
        if self.grid_size != grid::grid_size_for(self.total_users) {
            return Err(format!(
                "grid size {} does not match {} users",
                self.grid_size, self.total_users
            ));
        }
        if self.proposal_count() > self.max_resolutions() {
            return Err(format!(
                "{} proposals exceed the board's {} slots",
                self.proposal_count(),
                self.max_resolutions()
            ));
        }

        let total = self.total_squares();
        let center = self.center_index();
        let mut occupied = HashSet::new();
        let mut free_spaces = 0;
        for resolution in &self.resolutions {
            if resolution.is_free {
                free_spaces += 1;
                if resolution.grid_index != Some(center) {
                    return Err("free space is not on the center cell".to_owned());
                }
            }
            let Some(index) = resolution.grid_index else {
                continue;
            };
            if index >= total {
                return Err(format!(
                    "resolution {} at index {index} is off the board",
                    resolution.id
                ));
            }
            if !occupied.insert(index) {
                return Err(format!("grid index {index} is occupied twice"));
            }
            if resolution.is_free != (index == center) {
                return Err(format!(
                    "resolution {} misplaced relative to the free space",
                    resolution.id
                ));
            }
        }
        let expected_free = usize::from(self.phase == SessionPhase::Play);
        if free_spaces != expected_free {
            return Err(format!(
                "{free_spaces} free spaces in phase {:?}",
                self.phase
            ));
        }

        for (user_id, checked) in &self.checks {
            if self.user(user_id).is_none() {
                return Err(format!("checks recorded for unknown user {user_id}"));
            }
            if let Some(bad) = checked
                .iter()
                .find(|id| self.resolution(id).is_none_or(|r| r.is_free))
            {
                return Err(format!("user {user_id} has check on {bad}"));
            }
        }
        Ok(())
    }
}
