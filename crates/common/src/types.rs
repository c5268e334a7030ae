//! Outbound payload types shared by the channel and reply crates.

use {
    serde::{Deserialize, Serialize},
    std::time::{SystemTime, UNIX_EPOCH},
};

/// Current wall-clock time in epoch milliseconds.
#[must_use]
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Media attachment for an outbound message.
///
/// `url` is either a fetchable URL or a `data:<mime>;base64,<data>` URI for
/// payloads that were already downloaded and encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaPayload {
    pub url: String,
    pub mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl MediaPayload {
    /// Build an in-memory payload from already base64-encoded bytes.
    #[must_use]
    pub fn from_base64(mime_type: impl Into<String>, base64_data: &str) -> Self {
        let mime_type = mime_type.into();
        Self {
            url: format!("data:{mime_type};base64,{base64_data}"),
            mime_type,
            filename: None,
        }
    }

    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Base64 portion of a `data:` URI, or `None` for regular URLs.
    #[must_use]
    pub fn base64_data(&self) -> Option<&str> {
        if !self.url.starts_with("data:") {
            return None;
        }
        self.url.split_once(',').map(|(_, data)| data)
    }
}

/// A fully composed outbound reply: text plus optional media attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyPayload {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaPayload>,
}

impl ReplyPayload {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            media: None,
        }
    }

    #[must_use]
    pub fn with_media(mut self, media: MediaPayload) -> Self {
        self.media = Some(media);
        self
    }
}
