//! Inquiry session state and correlation bookkeeping.
//!
//! A session is a JSON record in the ephemeral store under `session_<id>`,
//! with companion keys tying a claiming phone to it (`phone_session_<phone>`)
//! and per-phone markers that rate-limit fallback replies and record
//! completed flows. The store owns every record's lifetime via TTLs; nothing
//! here caches across messages.

pub mod error;
pub mod keys;
pub mod phone;
pub mod registry;
pub mod session;

pub use {
    error::{Error, Result},
    registry::{ClaimOutcome, SessionRegistry},
    session::{Session, SessionStatus},
};
