//! Sidecar wire frames and inbound message types.

use serde::{Deserialize, Serialize};

/// An inbound chat message as the sidecar reports it.
///
/// `from` is the platform JID (`<phone>@c.us`); replies go back to it
/// verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub from: String,
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// Frames the sidecar pushes to us.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChannelEvent {
    /// A pairing QR code is waiting to be scanned.
    Qr { qr: String },
    /// Login finished; on a fresh pairing the channel identity changed.
    Authenticated,
    AuthFailure { error: String },
    /// The platform connection is up and messages will flow.
    Ready,
    Message(InboundMessage),
    Disconnected { reason: String },
    /// Ack for a `SidecarCommand` send; resolved internally, not forwarded.
    SendResult {
        request_id: String,
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

/// Frames we push to the sidecar. Every send carries a `request_id` the
/// sidecar echoes back in its `SendResult`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SidecarCommand {
    SendText {
        request_id: String,
        to: String,
        text: String,
    },
    SendMedia {
        request_id: String,
        to: String,
        caption: String,
        mime_type: String,
        /// Base64-encoded bytes.
        data: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
    },
}

impl SidecarCommand {
    #[must_use]
    pub fn request_id(&self) -> &str {
        match self {
            Self::SendText { request_id, .. } | Self::SendMedia { request_id, .. } => request_id,
        }
    }
}
