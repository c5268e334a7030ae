//! Image fetching for reply attachments.

use {anyhow::Context, base64::Engine};

use leadline_common::MediaPayload;

const FALLBACK_MIME: &str = "image/jpeg";

/// Downloads images and packs them into `data:` URI payloads the sidecar
/// can send without touching the network itself.
#[derive(Clone, Default)]
pub struct MediaFetcher {
    client: reqwest::Client,
}

impl MediaFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch `url` and encode the body as an inline attachment.
    pub async fn fetch(&self, url: &str, filename: &str) -> anyhow::Result<MediaPayload> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("fetching image {url}"))?
            .error_for_status()?;

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .unwrap_or_else(|| FALLBACK_MIME.to_string());

        let bytes = response.bytes().await?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
        Ok(MediaPayload::from_base64(mime_type, &encoded).with_filename(filename))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mockito::Server;

    use super::*;

    #[tokio::test]
    async fn fetch_builds_inline_payload() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/van.png")
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body("pngbytes")
            .create_async()
            .await;

        let fetcher = MediaFetcher::new();
        let media = fetcher
            .fetch(&format!("{}/van.png", server.url()), "van.png")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(media.mime_type, "image/png");
        assert_eq!(media.filename.as_deref(), Some("van.png"));
        assert_eq!(
            media.url,
            format!(
                "data:image/png;base64,{}",
                base64::engine::general_purpose::STANDARD.encode(b"pngbytes")
            )
        );
    }

    #[tokio::test]
    async fn missing_content_type_defaults_to_jpeg() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/bare")
            .with_status(200)
            .with_body("bytes")
            .create_async()
            .await;

        let fetcher = MediaFetcher::new();
        let media = fetcher
            .fetch(&format!("{}/bare", server.url()), "a.jpg")
            .await
            .unwrap();
        assert_eq!(media.mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn http_error_status_fails_the_fetch() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/gone.jpg")
            .with_status(404)
            .create_async()
            .await;

        let fetcher = MediaFetcher::new();
        let err = fetcher
            .fetch(&format!("{}/gone.jpg", server.url()), "gone.jpg")
            .await;
        assert!(err.is_err());
    }
}
