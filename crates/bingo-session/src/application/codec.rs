//! Session blob codec.
//!
//! Decoding is parse-or-reject: a blob that is not JSON, does not have the
//! session shape, or breaks the board's structural rules is reported as
//! `DomainError::CorruptSession` instead of being trusted.

use bingo_core::error::DomainError;
use bingo_core::repository::StoredSession;

use crate::domain::model::GameSession;

/// Serializes a session into its stored form.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if serialization fails.
pub fn encode_session(session: &GameSession) -> Result<StoredSession, DomainError> {
    let payload = serde_json::to_string(session)
        .map_err(|e| DomainError::Infrastructure(format!("session serialization failed: {e}")))?;
    Ok(StoredSession {
        session_id: session.id.clone(),
        payload,
    })
}

/// Parses and validates a stored blob.
///
/// # Errors
///
/// Returns `DomainError::CorruptSession` if the payload does not parse, is
/// stored under a different id than it claims, or fails shape validation.
pub fn decode_session(session_id: &str, payload: &str) -> Result<GameSession, DomainError> {
    let corrupt = |reason: String| DomainError::CorruptSession {
        session_id: session_id.to_owned(),
        reason,
    };

    let session: GameSession = serde_json::from_str(payload).map_err(|e| corrupt(e.to_string()))?;
    if session.id != session_id {
        return Err(corrupt(format!("blob claims id {}", session.id)));
    }
    session.validate_shape().map_err(corrupt)?;
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::engine::{add_resolution, create_session, finalize_board, toggle_check};
    use crate::domain::model::{FREE_SPACE_ID, Resolution};
    use std::collections::BTreeSet;
    use bingo_core::rng::SeededRng;
    use bingo_test_support::FixedClock;
    use chrono::{TimeZone, Utc};

    fn editing_session() -> GameSession {
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap());
        let mut rng = SeededRng::new(22);
        let session = create_session("Trip 2025", 4, "Ava", &clock, &mut rng);
        let ava = session.users[0].id.clone();
        add_resolution(&session, "Run", &ava, None, &mut rng)
    }

    fn assert_corrupt(session: &GameSession) {
        let payload = serde_json::to_string(session).unwrap();

        let result = decode_session(&session.id, &payload);

        assert!(
            matches!(result, Err(DomainError::CorruptSession { .. })),
            "decoded: {result:?}"
        );
    }

    fn played_session() -> GameSession {
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap());
        let mut rng = SeededRng::new(21);
        let mut session = create_session("Trip 2025", 4, "Ava", &clock, &mut rng);
        let ava = session.users[0].id.clone();
        session = add_resolution(&session, "Run", &ava, Some("5k"), &mut rng);
        session = add_resolution(&session, "Read", &ava, None, &mut rng);
        session = finalize_board(&session, &mut rng);
        let first = session.resolution_at(0).unwrap().id.clone();
        toggle_check(&session, &ava, &first)
    }

    #[test]
    fn test_decode_after_encode_is_deep_equal() {
        let session = played_session();

        let stored = encode_session(&session).unwrap();
        let decoded = decode_session(&stored.session_id, &stored.payload).unwrap();

        assert_eq!(stored.session_id, session.id);
        assert_eq!(decoded, session);
    }

    #[test]
    fn test_decode_rejects_non_json() {
        match decode_session("abc", "not json").unwrap_err() {
            DomainError::CorruptSession { session_id, .. } => assert_eq!(session_id, "abc"),
            other => panic!("expected CorruptSession, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_foreign_shape() {
        let result = decode_session("abc", r#"{"id":"abc","theme":"dark"}"#);

        assert!(matches!(result, Err(DomainError::CorruptSession { .. })));
    }

    #[test]
    fn test_decode_rejects_mismatched_id() {
        let stored = encode_session(&played_session()).unwrap();

        let result = decode_session("someone-else", &stored.payload);

        assert!(matches!(result, Err(DomainError::CorruptSession { .. })));
    }

    #[test]
    fn test_decode_rejects_broken_board() {
        let mut session = played_session();
        session.resolutions[0].grid_index = Some(99);
        let payload = serde_json::to_string(&session).unwrap();

        let result = decode_session(&session.id, &payload);

        assert!(matches!(result, Err(DomainError::CorruptSession { .. })));
    }

    #[test]
    fn test_decode_accepts_blob_without_background_field() {
        let session = played_session();
        let mut value = serde_json::to_value(&session).unwrap();
        value.as_object_mut().unwrap().remove("backgroundElements");

        let decoded = decode_session(&session.id, &value.to_string()).unwrap();

        assert!(decoded.background_elements.is_empty());
    }

    #[test]
    fn test_decode_rejects_huge_user_count_without_panicking() {
        let mut value = serde_json::to_value(played_session()).unwrap();
        value["totalUsers"] = serde_json::json!(u32::MAX);
        let id = value["id"].as_str().unwrap().to_owned();

        let result = decode_session(&id, &value.to_string());

        assert!(matches!(result, Err(DomainError::CorruptSession { .. })));
    }

    #[test]
    fn test_decode_rejects_checks_on_free_space_or_missing_goal() {
        for bad in [FREE_SPACE_ID, "nonexistent"] {
            let mut session = played_session();
            let ava = session.users[0].id.clone();
            session
                .checks
                .insert(ava, BTreeSet::from([bad.to_owned()]));

            assert_corrupt(&session);
        }
    }

    #[test]
    fn test_decode_rejects_checks_for_unknown_user() {
        let mut session = played_session();
        session.checks.insert("ghost-user".to_owned(), BTreeSet::new());

        assert_corrupt(&session);
    }

    #[test]
    fn test_decode_rejects_free_space_in_edit_phase() {
        let mut session = editing_session();
        session.resolutions.push(Resolution::free_space(12));

        assert_corrupt(&session);
    }

    #[test]
    fn test_decode_rejects_overfull_edit_board() {
        let mut session = editing_session();
        let template = session.resolutions[0].clone();
        session.resolutions = (0..31)
            .map(|i| Resolution {
                id: format!("extra{i:04}"),
                grid_index: None,
                ..template.clone()
            })
            .collect();

        assert_corrupt(&session);
    }
}
