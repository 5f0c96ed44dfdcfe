//! Share links.
//!
//! A session is shared as the page address with the session id as its
//! fragment: `https://host/path#<sessionId>`.

/// Builds the share link for `session_id`. Any fragment already on
/// `base_url` is replaced.
#[must_use]
pub fn share_link(base_url: &str, session_id: &str) -> String {
    let base = base_url.split_once('#').map_or(base_url, |(base, _)| base);
    format!("{base}#{session_id}")
}

/// Extracts a session id from a full share link, a bare `#id` fragment or
/// a bare id. Returns `None` when nothing usable remains.
#[must_use]
pub fn parse_share_token(input: &str) -> Option<String> {
    let input = input.trim();
    let token = input.rsplit_once('#').map_or(input, |(_, fragment)| fragment);
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_owned())
    }
}
