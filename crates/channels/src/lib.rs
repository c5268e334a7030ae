//! Messaging channel plumbing.
//!
//! The chat platform connection lives in a pairing sidecar process that owns
//! QR login and the actual socket to the platform. This crate speaks the
//! sidecar's JSON frame protocol over a WebSocket: inbound events stream out
//! through an mpsc channel, outbound sends are acknowledged per request so
//! delivery failures are observable to the reply pipeline.

pub mod outbound;
pub mod sidecar;
pub mod types;

pub use {
    outbound::{ChatOutbound, SidecarOutbound},
    sidecar::{SidecarHandle, connect_with_retry},
    types::{ChannelEvent, InboundMessage, SidecarCommand},
};
