//! Store key namespace and record lifetimes.

use std::time::Duration;

/// TTL for session records and phone claims.
pub const SESSION_TTL_SECS: u64 = 600;
/// TTL for fallback and completion markers.
pub const MARKER_TTL_SECS: u64 = 86_400;
/// Oldest a pending session may be and still accept a claim.
pub const MAX_CLAIM_AGE: Duration = Duration::from_secs(10 * 60);

pub const SESSION_PREFIX: &str = "session_";
pub const PHONE_CLAIM_PREFIX: &str = "phone_session_";

#[must_use]
pub fn session(session_id: &str) -> String {
    format!("{SESSION_PREFIX}{session_id}")
}

#[must_use]
pub fn phone_claim(phone: &str) -> String {
    format!("{PHONE_CLAIM_PREFIX}{phone}")
}

#[must_use]
pub fn fallback_marker(phone: &str) -> String {
    format!("fallback_user_{phone}")
}

#[must_use]
pub fn completion_marker(phone: &str) -> String {
    format!("completed_user_{phone}")
}
