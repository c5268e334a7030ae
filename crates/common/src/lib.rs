//! Shared types and small utilities used across all leadline crates.

pub mod types;

pub use types::{MediaPayload, ReplyPayload, now_ms};
