//! Session record and status machine.

use serde::{Deserialize, Serialize};

/// Lifecycle of an inquiry session.
///
/// Forward-only, with one explicit revert: `bridge_sending → pending` when
/// the bridge send fails after the in-flight mark was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    Active,
    BridgeSending,
    BridgeSent,
    ResponseSent,
}

impl SessionStatus {
    /// True once a reply is being or has been delivered. Further inbound
    /// messages from the claiming phone must stay silent here.
    #[must_use]
    pub fn in_flight(self) -> bool {
        matches!(
            self,
            Self::BridgeSending | Self::BridgeSent | Self::ResponseSent
        )
    }
}

/// A web-initiated inquiry session, stored as JSON under `session_<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: String,
    pub company_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Creation time, epoch milliseconds.
    pub timestamp: i64,
    pub status: SessionStatus,
    /// Normalized phone holding the claim on this session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_by: Option<String>,
    /// Set together with `bridge_sent`; re-checked before the delayed
    /// profile reply fires.
    #[serde(default)]
    pub response_scheduled: bool,
}

impl Session {
    /// Age relative to `now_ms`, in milliseconds. Clock skew clamps to zero.
    #[must_use]
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        (now_ms - self.timestamp).max(0)
    }

    /// Whole minutes since creation.
    #[must_use]
    pub fn age_minutes(&self, now_ms: i64) -> i64 {
        self.age_ms(now_ms) / 60_000
    }
}
