//! Store-backed registry for sessions, claims, and per-phone markers.

use std::{sync::Arc, time::Duration};

use {
    async_stream::try_stream,
    futures::Stream,
    tracing::{debug, info, warn},
    uuid::Uuid,
};

use {leadline_common::now_ms, leadline_store::KvStore};

use crate::{
    error::{Error, Result},
    keys, phone,
    session::{Session, SessionStatus},
};

/// Outcome of attempting to claim a session for a phone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The claim was created and the session marked active.
    Claimed(Session),
    /// This phone already holds the claim on this session; TTL refreshed.
    AlreadyOurs(Session),
    /// Another phone holds it, or the session is already mid-delivery.
    Unavailable,
    /// The record disappeared between scan and claim.
    Gone,
}

/// One registry per process, shared by the HTTP surface and the reply core.
///
/// All state lives in the store; the registry itself is just key math and
/// record codecs, so cloning it is cheap and instances never disagree.
#[derive(Clone)]
pub struct SessionRegistry {
    store: Arc<dyn KvStore>,
    country_code: String,
}

impl SessionRegistry {
    pub fn new(store: Arc<dyn KvStore>, country_code: impl Into<String>) -> Self {
        Self {
            store,
            country_code: country_code.into(),
        }
    }

    /// Canonical form of a raw phone number.
    #[must_use]
    pub fn normalize_phone(&self, raw: &str) -> String {
        phone::normalize(raw, &self.country_code)
    }

    /// Canonical phone from a channel JID (`<phone>@c.us`).
    #[must_use]
    pub fn phone_from_jid(&self, jid: &str) -> String {
        phone::from_jid(jid, &self.country_code)
    }

    // ── Session records ─────────────────────────────────────────────────

    pub async fn create(&self, company_id: &str, image_url: Option<String>) -> Result<Session> {
        let session = Session {
            session_id: Uuid::new_v4().to_string(),
            company_id: company_id.to_string(),
            image_url,
            timestamp: now_ms(),
            status: SessionStatus::Pending,
            claimed_by: None,
            response_scheduled: false,
        };
        self.persist(&session).await?;
        info!(session_id = %session.session_id, company_id, "created inquiry session");
        Ok(session)
    }

    /// Write the record back under its key, refreshing the TTL.
    pub async fn persist(&self, session: &Session) -> Result<()> {
        let payload = serde_json::to_string(session)?;
        self.store
            .set_ex(
                &keys::session(&session.session_id),
                &payload,
                keys::SESSION_TTL_SECS,
            )
            .await?;
        Ok(())
    }

    pub async fn get(&self, session_id: &str) -> Result<Option<Session>> {
        self.fetch(&keys::session(session_id)).await
    }

    async fn fetch(&self, key: &str) -> Result<Option<Session>> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        let session = serde_json::from_str(&raw).map_err(|source| Error::InvalidRecord {
            key: key.to_string(),
            source,
        })?;
        Ok(Some(session))
    }

    /// Persist a status change. Callers adjust `response_scheduled` first;
    /// overwrites are last-write-wins.
    pub async fn transition(&self, session: &mut Session, status: SessionStatus) -> Result<()> {
        session.status = status;
        self.persist(session).await?;
        debug!(session_id = %session.session_id, ?status, "session transition");
        Ok(())
    }

    pub async fn delete(&self, session_id: &str) -> Result<()> {
        self.store.delete(&keys::session(session_id)).await?;
        Ok(())
    }

    // ── Claims ──────────────────────────────────────────────────────────

    /// Session id the phone has claimed, if any claim is live.
    pub async fn find_claim(&self, phone: &str) -> Result<Option<String>> {
        Ok(self.store.get(&keys::phone_claim(phone)).await?)
    }

    /// Try to claim a session for a phone.
    ///
    /// Re-reads the record so the decision is made against fresh state, then
    /// takes the claim key with an atomic set-if-absent. The session-side
    /// ownership mark is a separate write, so two processes racing on the
    /// same fresh read keep a small double-claim window; within one process
    /// the sequential inbound loop makes this linearizable.
    pub async fn claim(&self, phone: &str, session_id: &str) -> Result<ClaimOutcome> {
        let Some(session) = self.get(session_id).await? else {
            return Ok(ClaimOutcome::Gone);
        };
        if session.status.in_flight() {
            return Ok(ClaimOutcome::Unavailable);
        }
        if let Some(owner) = &session.claimed_by
            && owner != phone
        {
            return Ok(ClaimOutcome::Unavailable);
        }
        // Past the matching age bound a session accepts no new claimants;
        // a phone that already holds it may keep going.
        if session.claimed_by.is_none()
            && session.age_ms(now_ms()) > keys::MAX_CLAIM_AGE.as_millis() as i64
        {
            return Ok(ClaimOutcome::Unavailable);
        }

        let claim_key = keys::phone_claim(phone);
        let created = self
            .store
            .set_nx_ex(&claim_key, session_id, keys::SESSION_TTL_SECS)
            .await?;
        if !created {
            match self.store.get(&claim_key).await? {
                Some(existing) if existing == session_id => {
                    self.store
                        .set_ex(&claim_key, session_id, keys::SESSION_TTL_SECS)
                        .await?;
                },
                // The phone holds a claim on some other session; that claim
                // wins until it expires.
                _ => return Ok(ClaimOutcome::Unavailable),
            }
        }

        let mut claimed = session;
        let first_claim = claimed.claimed_by.is_none();
        claimed.claimed_by = Some(phone.to_string());
        claimed.status = SessionStatus::Active;
        self.persist(&claimed).await?;

        if first_claim && created {
            info!(session_id, phone, "claimed session");
            Ok(ClaimOutcome::Claimed(claimed))
        } else {
            debug!(session_id, phone, "refreshed existing claim");
            Ok(ClaimOutcome::AlreadyOurs(claimed))
        }
    }

    pub async fn delete_claim(&self, phone: &str) -> Result<()> {
        self.store.delete(&keys::phone_claim(phone)).await?;
        Ok(())
    }

    // ── Scanning ────────────────────────────────────────────────────────

    /// Lazily yield pending sessions no older than `max_age`, unordered.
    ///
    /// Records that vanish or fail to decode mid-scan are skipped with a
    /// warning rather than aborting the scan.
    pub fn scan_pending(&self, max_age: Duration) -> impl Stream<Item = Result<Session>> + '_ {
        try_stream! {
            let pattern = format!("{}*", keys::SESSION_PREFIX);
            let session_keys = self.store.keys(&pattern).await?;
            let now = now_ms();
            let cutoff_ms = max_age.as_millis() as i64;
            for key in session_keys {
                let session = match self.fetch(&key).await {
                    Ok(Some(session)) => session,
                    Ok(None) => continue,
                    Err(e) => {
                        warn!(key, error = %e, "skipping unreadable session record");
                        continue;
                    },
                };
                if session.status != SessionStatus::Pending {
                    continue;
                }
                if session.age_ms(now) > cutoff_ms {
                    debug!(session_id = %session.session_id, "pending session too old to claim");
                    continue;
                }
                yield session;
            }
        }
    }

    /// Snapshot of every live session record, for operator tooling.
    pub async fn list_sessions(&self) -> Result<Vec<Session>> {
        let pattern = format!("{}*", keys::SESSION_PREFIX);
        let mut sessions = Vec::new();
        for key in self.store.keys(&pattern).await? {
            match self.fetch(&key).await {
                Ok(Some(session)) => sessions.push(session),
                Ok(None) => {},
                Err(e) => warn!(key, error = %e, "skipping unreadable session record"),
            }
        }
        Ok(sessions)
    }

    // ── Completion and markers ──────────────────────────────────────────

    /// Final cleanup once a flow ends: drop the session and its claim, and
    /// set the completion marker that forecloses fallback replies.
    pub async fn complete(&self, session: &Session) -> Result<()> {
        self.delete(&session.session_id).await?;
        if let Some(phone) = &session.claimed_by {
            self.delete_claim(phone).await?;
            self.mark_completed(phone).await?;
        }
        info!(session_id = %session.session_id, "inquiry flow completed");
        Ok(())
    }

    pub async fn mark_fallback(&self, phone: &str) -> Result<()> {
        self.store
            .set_ex(&keys::fallback_marker(phone), "1", keys::MARKER_TTL_SECS)
            .await?;
        Ok(())
    }

    pub async fn has_fallback(&self, phone: &str) -> Result<bool> {
        Ok(self.store.exists(&keys::fallback_marker(phone)).await?)
    }

    pub async fn mark_completed(&self, phone: &str) -> Result<()> {
        self.store
            .set_ex(&keys::completion_marker(phone), "true", keys::MARKER_TTL_SECS)
            .await?;
        Ok(())
    }

    pub async fn is_completed(&self, phone: &str) -> Result<bool> {
        Ok(self.store.exists(&keys::completion_marker(phone)).await?)
    }

    // ── Hygiene ─────────────────────────────────────────────────────────

    /// Count the keys `purge_sessions` would remove, without removing them.
    pub async fn count_purgeable(&self) -> Result<usize> {
        let mut count = 0usize;
        for prefix in [keys::SESSION_PREFIX, keys::PHONE_CLAIM_PREFIX] {
            count += self.store.keys(&format!("{prefix}*")).await?.len();
        }
        Ok(count)
    }

    /// Remove every session record and phone claim. Run after a re-pairing,
    /// when records tied to the previous channel identity can no longer be
    /// honored. Markers survive; they are per-phone, not per-identity.
    pub async fn purge_sessions(&self) -> Result<usize> {
        let mut removed = 0usize;
        for prefix in [keys::SESSION_PREFIX, keys::PHONE_CLAIM_PREFIX] {
            for key in self.store.keys(&format!("{prefix}*")).await? {
                self.store.delete(&key).await?;
                removed += 1;
            }
        }
        if removed > 0 {
            info!(removed, "purged session state");
        }
        Ok(removed)
    }
}
