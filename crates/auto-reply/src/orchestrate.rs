//! Two-part reply delivery and the session state machine that guards it.

use std::{sync::Arc, time::Duration};

use {
    anyhow::Context,
    tracing::{debug, info, warn},
};

use {
    leadline_channels::ChatOutbound,
    leadline_common::ReplyPayload,
    leadline_directory::{CompanyDetails, ProfileDirectory},
    leadline_sessions::{Session, SessionRegistry, SessionStatus},
};

use crate::{
    format::{COMPANY_UNAVAILABLE_APOLOGY, format_bridge, format_profile},
    media::MediaFetcher,
    schedule::Scheduler,
};

/// Gap between the bridge reply and the detailed profile reply.
pub const DEFAULT_RESPONSE_DELAY: Duration = Duration::from_secs(30);

/// Sequences delivery for a matched session: bridge now, profile later,
/// cleanup always.
pub struct ReplyOrchestrator {
    registry: SessionRegistry,
    directory: Arc<dyn ProfileDirectory>,
    outbound: Arc<dyn ChatOutbound>,
    scheduler: Arc<dyn Scheduler>,
    media: MediaFetcher,
    response_delay: Duration,
}

impl ReplyOrchestrator {
    pub fn new(
        registry: SessionRegistry,
        directory: Arc<dyn ProfileDirectory>,
        outbound: Arc<dyn ChatOutbound>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            registry,
            directory,
            outbound,
            scheduler,
            media: MediaFetcher::new(),
            response_delay: DEFAULT_RESPONSE_DELAY,
        }
    }

    #[must_use]
    pub fn with_response_delay(mut self, delay: Duration) -> Self {
        self.response_delay = delay;
        self
    }

    /// Deliver the reply for a correlated session.
    ///
    /// The `bridge_sending` mark is persisted before anything is sent;
    /// failing that write aborts the turn rather than risking a duplicate
    /// bridge. A failed bridge send reverts the session to `pending` so a
    /// later message can retry the whole turn.
    pub async fn deliver(&self, to: &str, mut session: Session) -> anyhow::Result<()> {
        let profile = match self.directory.lookup(&session.company_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                warn!(company_id = %session.company_id, "no listing for session");
                return self.outbound.send_text(to, COMPANY_UNAVAILABLE_APOLOGY).await;
            },
            Err(e) => {
                warn!(company_id = %session.company_id, error = %e, "listing lookup failed");
                return self.outbound.send_text(to, COMPANY_UNAVAILABLE_APOLOGY).await;
            },
        };

        let bridge_text = format_bridge(&profile.bridge_message);

        self.registry
            .transition(&mut session, SessionStatus::BridgeSending)
            .await
            .context("marking session bridge_sending")?;

        let filename = match &profile.details {
            Some(details) => format!("{}.jpg", details.company),
            None => format!("company-{}.jpg", profile.id),
        };
        let sent = send_with_degrade(
            self.outbound.as_ref(),
            &self.media,
            to,
            &bridge_text,
            session.image_url.as_deref(),
            &filename,
        )
        .await;

        if let Err(e) = sent {
            warn!(session_id = %session.session_id, error = %e, "bridge send failed, reverting");
            session.response_scheduled = false;
            self.registry
                .transition(&mut session, SessionStatus::Pending)
                .await
                .context("reverting session after failed bridge send")?;
            return Ok(());
        }

        let Some(details) = &profile.details else {
            // Minimal listing: the bridge is the whole reply.
            self.registry.complete(&session).await?;
            return Ok(());
        };

        session.response_scheduled = true;
        self.registry
            .transition(&mut session, SessionStatus::BridgeSent)
            .await
            .context("marking session bridge_sent")?;
        info!(
            session_id = %session.session_id,
            delay_secs = self.response_delay.as_secs(),
            "bridge sent, profile reply scheduled"
        );

        self.schedule_profile_reply(to, &session, details, profile.company_image.clone());
        Ok(())
    }

    /// Queue the delayed profile reply. The task re-reads the session when it
    /// fires: deletion or a cleared `response_scheduled` flag in the meantime
    /// cancels it. Once the checks pass, cleanup runs whether or not the send
    /// succeeds.
    fn schedule_profile_reply(
        &self,
        to: &str,
        session: &Session,
        details: &CompanyDetails,
        company_image: Option<String>,
    ) {
        let registry = self.registry.clone();
        let outbound = Arc::clone(&self.outbound);
        let media = self.media.clone();
        let to = to.to_string();
        let session_id = session.session_id.clone();
        let text = format_profile(details);
        let filename = format!("{}.jpg", details.company);

        let task = async move {
            let current = match registry.get(&session_id).await {
                Ok(Some(session)) if session.response_scheduled => session,
                Ok(_) => {
                    debug!(session_id, "profile reply no longer scheduled, skipping");
                    return;
                },
                Err(e) => {
                    warn!(session_id, error = %e, "session re-read failed, skipping profile reply");
                    return;
                },
            };

            if let Err(e) = send_with_degrade(
                outbound.as_ref(),
                &media,
                &to,
                &text,
                company_image.as_deref(),
                &filename,
            )
            .await
            {
                warn!(session_id, error = %e, "profile send failed");
            }

            if let Err(e) = registry.complete(&current).await {
                warn!(session_id, error = %e, "cleanup after profile reply failed");
            }
        };
        self.scheduler
            .schedule_after(self.response_delay, Box::pin(task));
    }
}

/// Send `text`, attaching the image at `image_url` when one is given.
///
/// Fetch and media-send failures degrade to plain text; only a failed text
/// send errors out.
async fn send_with_degrade(
    outbound: &dyn ChatOutbound,
    media: &MediaFetcher,
    to: &str,
    text: &str,
    image_url: Option<&str>,
    filename: &str,
) -> anyhow::Result<()> {
    if let Some(url) = image_url {
        match media.fetch(url, filename).await {
            Ok(attachment) => {
                let payload = ReplyPayload::text(text).with_media(attachment);
                match outbound.send_media(to, &payload).await {
                    Ok(()) => return Ok(()),
                    Err(e) => warn!(to, error = %e, "media send failed, falling back to text"),
                }
            },
            Err(e) => warn!(url, error = %e, "image fetch failed, sending text only"),
        }
    }
    outbound.send_text(to, text).await
}
