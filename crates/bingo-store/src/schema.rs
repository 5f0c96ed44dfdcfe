//! Session store database schema.

/// SQL to create the sessions table. One row per session, replaced whole on
/// every save.
pub const CREATE_SESSIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS game_sessions (
    session_key TEXT PRIMARY KEY,
    session_id  TEXT NOT NULL,
    payload     TEXT NOT NULL,
    updated_at  TEXT NOT NULL
)
";
