//! Inbound message handling: session correlation, two-part reply delivery,
//! and the rate-limited fallback for unmatched senders.
//!
//! The flow for one inbound message is [`pipeline::ReplyPipeline::handle_message`]:
//! correlate the sender to a session, send the bridge reply, then schedule the
//! detailed profile reply after a fixed delay. All state lives in the session
//! store; nothing here caches between messages.

pub mod correlate;
pub mod format;
pub mod media;
pub mod orchestrate;
pub mod pipeline;
pub mod schedule;

pub use {
    correlate::{Correlation, Correlator, SilentReason},
    media::MediaFetcher,
    orchestrate::ReplyOrchestrator,
    pipeline::ReplyPipeline,
    schedule::{ManualScheduler, Scheduler, TokioScheduler},
};
