//! Outbound send seam.

use {anyhow::Result, async_trait::async_trait, uuid::Uuid};

use leadline_common::ReplyPayload;

use crate::{sidecar::SidecarHandle, types::SidecarCommand};

/// Outbound sender for the chat channel. The reply pipeline only sees this
/// trait; tests substitute a recording fake.
#[async_trait]
pub trait ChatOutbound: Send + Sync {
    async fn send_text(&self, to: &str, text: &str) -> Result<()>;

    /// Send text with its media attachment. Media must already be fetched
    /// into a `data:` URI; plain URLs are refused here rather than fetched
    /// mid-send.
    async fn send_media(&self, to: &str, payload: &ReplyPayload) -> Result<()>;
}

/// `ChatOutbound` over the sidecar link.
pub struct SidecarOutbound {
    handle: SidecarHandle,
}

impl SidecarOutbound {
    #[must_use]
    pub fn new(handle: SidecarHandle) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl ChatOutbound for SidecarOutbound {
    async fn send_text(&self, to: &str, text: &str) -> Result<()> {
        self.handle
            .send(SidecarCommand::SendText {
                request_id: Uuid::new_v4().to_string(),
                to: to.to_string(),
                text: text.to_string(),
            })
            .await
    }

    async fn send_media(&self, to: &str, payload: &ReplyPayload) -> Result<()> {
        let Some(media) = &payload.media else {
            return self.send_text(to, &payload.text).await;
        };
        let Some(data) = media.base64_data() else {
            anyhow::bail!("media payload must be fetched into a data: URI before sending");
        };
        self.handle
            .send(SidecarCommand::SendMedia {
                request_id: Uuid::new_v4().to_string(),
                to: to.to_string(),
                caption: payload.text.clone(),
                mime_type: media.mime_type.clone(),
                data: data.to_string(),
                filename: media.filename.clone(),
            })
            .await
    }
}
