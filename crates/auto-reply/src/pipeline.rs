//! Entry point wiring correlation to delivery for each inbound message.

use std::sync::Arc;

use tracing::{debug, info};

use leadline_channels::{ChatOutbound, InboundMessage};

use crate::{
    correlate::{Correlation, Correlator},
    format::{EXPIRED_LINK_NOTICE, PING_COMMAND, PONG_REPLY},
    orchestrate::ReplyOrchestrator,
};

/// Everything that happens for one inbound message.
pub struct ReplyPipeline {
    correlator: Correlator,
    orchestrator: ReplyOrchestrator,
    outbound: Arc<dyn ChatOutbound>,
}

impl ReplyPipeline {
    pub fn new(
        correlator: Correlator,
        orchestrator: ReplyOrchestrator,
        outbound: Arc<dyn ChatOutbound>,
    ) -> Self {
        Self {
            correlator,
            orchestrator,
            outbound,
        }
    }

    /// Handle one inbound message. An error means this turn was dropped;
    /// the process keeps running either way.
    pub async fn handle_message(&self, message: &InboundMessage) -> anyhow::Result<()> {
        info!(from = %message.from, "incoming message: {}", message.body);

        if message.body == PING_COMMAND {
            return self.outbound.send_text(&message.from, PONG_REPLY).await;
        }

        match self
            .correlator
            .correlate(&message.from, &message.body)
            .await?
        {
            Correlation::Matched(session) => {
                info!(
                    from = %message.from,
                    session_id = %session.session_id,
                    "matched inquiry session"
                );
                self.orchestrator.deliver(&message.from, session).await
            },
            Correlation::ExpiredNotice => {
                self.outbound
                    .send_text(&message.from, EXPIRED_LINK_NOTICE)
                    .await
            },
            Correlation::Silent(reason) => {
                debug!(from = %message.from, ?reason, "staying silent");
                Ok(())
            },
        }
    }
}
