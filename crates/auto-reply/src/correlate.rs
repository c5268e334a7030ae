//! Matching inbound messages to inquiry sessions.

use {
    futures::StreamExt,
    tracing::{debug, info, warn},
};

use leadline_sessions::{ClaimOutcome, Error, Result, Session, SessionRegistry, keys};

/// Why an inbound message produced no reply at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SilentReason {
    /// The claimed session is mid-delivery or already answered.
    InFlight,
    /// A claim exists but its session record is gone or unusable.
    StaleClaim,
    /// The sender finished a flow recently.
    Completed,
    /// The canned expired-link notice already went out within its window.
    FallbackAlreadySent,
}

/// What an inbound message correlates to.
#[derive(Debug)]
pub enum Correlation {
    /// Deliver the two-part reply for this session.
    Matched(Session),
    /// Send the one-time expired-link notice.
    ExpiredNotice,
    /// Say nothing.
    Silent(SilentReason),
}

/// The matching algorithm. Holds no state of its own; every decision is made
/// against the store so concurrent handlers see each other's progress.
pub struct Correlator {
    registry: SessionRegistry,
}

impl Correlator {
    #[must_use]
    pub fn new(registry: SessionRegistry) -> Self {
        Self { registry }
    }

    /// Resolve a sender to a session, in strict precedence order: existing
    /// claim, pending scan, embedded legacy token, then the fallback markers.
    pub async fn correlate(&self, from: &str, body: &str) -> Result<Correlation> {
        let phone = self.registry.phone_from_jid(from);

        if let Some(session_id) = self.registry.find_claim(&phone).await? {
            return self.resolve_claim(&phone, &session_id).await;
        }

        if let Some(session) = self.claim_from_scan(&phone).await? {
            return Ok(Correlation::Matched(session));
        }

        if let Some(session) = self.claim_from_token(&phone, body).await? {
            return Ok(Correlation::Matched(session));
        }

        self.fallback(&phone).await
    }

    /// A live claim pins the phone to one session; the session's status
    /// decides whether this message starts delivery or is a duplicate.
    async fn resolve_claim(&self, phone: &str, session_id: &str) -> Result<Correlation> {
        let session = match self.registry.get(session_id).await {
            Ok(Some(session)) => session,
            Ok(None) => {
                warn!(phone, session_id, "claim points at a missing session");
                return Ok(Correlation::Silent(SilentReason::StaleClaim));
            },
            Err(Error::InvalidRecord { key, source }) => {
                warn!(phone, key, error = %source, "claim points at an unreadable session");
                return Ok(Correlation::Silent(SilentReason::StaleClaim));
            },
            Err(e) => return Err(e),
        };

        if session.company_id.is_empty() {
            warn!(phone, session_id, "claimed session has no company id");
            return Ok(Correlation::Silent(SilentReason::StaleClaim));
        }
        if session.status.in_flight() {
            debug!(
                phone,
                session_id,
                status = ?session.status,
                "duplicate message for in-flight session"
            );
            return Ok(Correlation::Silent(SilentReason::InFlight));
        }
        Ok(Correlation::Matched(session))
    }

    /// First eligible pending session wins. A candidate another phone grabs
    /// between scan and claim is skipped, not an error.
    async fn claim_from_scan(&self, phone: &str) -> Result<Option<Session>> {
        let stream = self.registry.scan_pending(keys::MAX_CLAIM_AGE);
        futures::pin_mut!(stream);
        while let Some(candidate) = stream.next().await {
            let candidate = candidate?;
            match self.registry.claim(phone, &candidate.session_id).await? {
                ClaimOutcome::Claimed(session) | ClaimOutcome::AlreadyOurs(session) => {
                    return Ok(Some(session));
                },
                ClaimOutcome::Unavailable | ClaimOutcome::Gone => {},
            }
        }
        Ok(None)
    }

    /// Older site links paste the session id into the prefilled message;
    /// honor those by direct lookup, subject to the same claim rules.
    async fn claim_from_token(&self, phone: &str, body: &str) -> Result<Option<Session>> {
        let Some(token) = extract_session_token(body) else {
            return Ok(None);
        };
        match self.registry.claim(phone, token).await {
            Ok(ClaimOutcome::Claimed(session) | ClaimOutcome::AlreadyOurs(session)) => {
                info!(phone, token, "matched session via embedded token");
                Ok(Some(session))
            },
            Ok(ClaimOutcome::Unavailable | ClaimOutcome::Gone) => Ok(None),
            Err(Error::InvalidRecord { key, source }) => {
                warn!(phone, key, error = %source, "token points at an unreadable session");
                Ok(None)
            },
            Err(e) => Err(e),
        }
    }

    /// No session anywhere. Completed phones stay silent forever; everyone
    /// else gets the expired-link notice once per marker window.
    async fn fallback(&self, phone: &str) -> Result<Correlation> {
        if self.registry.is_completed(phone).await? {
            return Ok(Correlation::Silent(SilentReason::Completed));
        }
        if self.registry.has_fallback(phone).await? {
            return Ok(Correlation::Silent(SilentReason::FallbackAlreadySent));
        }
        self.registry.mark_fallback(phone).await?;
        Ok(Correlation::ExpiredNotice)
    }
}

const TOKEN_LEN: usize = 36;

/// Find a session token (lowercase hex UUID, 8-4-4-4-12) in message text.
fn extract_session_token(body: &str) -> Option<&str> {
    let bytes = body.as_bytes();
    if bytes.len() < TOKEN_LEN {
        return None;
    }
    (0..=bytes.len() - TOKEN_LEN)
        .find(|&start| is_token(&bytes[start..start + TOKEN_LEN]))
        .map(|start| &body[start..start + TOKEN_LEN])
}

fn is_token(window: &[u8]) -> bool {
    window.iter().enumerate().all(|(i, &b)| match i {
        8 | 13 | 18 | 23 => b == b'-',
        _ => matches!(b, b'0'..=b'9' | b'a'..=b'f'),
    })
}
