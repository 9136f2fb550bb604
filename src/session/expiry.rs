//! Session-expiry detection from remote error text.
//!
//! The remote client exposes no structured error codes, so this is a substring
//! heuristic: testable, but only as complete as the marker list.

/// Markers matched case-insensitively against the error text.
pub const SESSION_EXPIRY_MARKERS: &[&str] = &[
    "INVALID_SESSION_ID",
    "Session expired or invalid",
    "401 Unauthorized",
];

pub fn is_session_expired(message: &str) -> bool {
    let lower = message.to_lowercase();
    SESSION_EXPIRY_MARKERS
        .iter()
        .any(|m| lower.contains(&m.to_lowercase()))
}
