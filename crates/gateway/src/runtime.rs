//! Process startup and the inbound event loop.
//!
//! One process runs two things side by side: the HTTP api (spawned) and the
//! channel event loop (owned by [`run`]). The loop is the only consumer of
//! sidecar events; handlers run to completion one at a time, so mutual
//! exclusion between concurrent claims comes from store-level state, not
//! from anything in here.

use std::{sync::Arc, time::Duration};

use {
    anyhow::{Context, Result},
    tokio::{signal, sync::mpsc},
    tracing::{debug, error, info, warn},
};

use {
    leadline_auto_reply::{Correlator, ReplyOrchestrator, ReplyPipeline, TokioScheduler},
    leadline_channels::{ChannelEvent, ChatOutbound, SidecarOutbound, connect_with_retry},
    leadline_config::LeadlineConfig,
    leadline_directory::SheetDirectory,
    leadline_sessions::SessionRegistry,
    leadline_store::{KvStore, RedisStore},
};

use crate::server;

const EVENT_BUFFER: usize = 64;

/// Run the whole process. Returns on shutdown signal or when the sidecar
/// event stream closes; an unreachable store at startup is fatal.
pub async fn run(config: LeadlineConfig) -> Result<()> {
    let store = RedisStore::connect(&config.store.url)
        .await
        .context("session store unreachable, cannot start")?;
    let store: Arc<dyn KvStore> = Arc::new(store);
    let registry = SessionRegistry::new(store, &config.matching.country_code);

    let directory = Arc::new(SheetDirectory::new(
        &config.directory.sheet_id,
        &config.directory.range,
        &config.directory.api_key,
    ));

    let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
    let handle = connect_with_retry(
        &config.channel.sidecar_url,
        events_tx,
        config.channel.connect_attempts,
    )
    .await?;
    let outbound: Arc<dyn ChatOutbound> = Arc::new(SidecarOutbound::new(handle));

    let orchestrator = ReplyOrchestrator::new(
        registry.clone(),
        directory,
        Arc::clone(&outbound),
        Arc::new(TokioScheduler),
    )
    .with_response_delay(Duration::from_secs(config.reply.response_delay_secs));
    let pipeline = ReplyPipeline::new(
        Correlator::new(registry.clone()),
        orchestrator,
        Arc::clone(&outbound),
    );

    let app = server::build_app(registry.clone(), &config.channel.bot_phone);
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.server.bind, config.server.port))
            .await
            .with_context(|| {
                format!(
                    "failed to bind {}:{}",
                    config.server.bind, config.server.port
                )
            })?;
    info!(addr = %listener.local_addr()?, "http api listening");
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "http api stopped");
        }
    });

    event_loop(pipeline, registry, events_rx).await;
    Ok(())
}

async fn event_loop(
    pipeline: ReplyPipeline,
    registry: SessionRegistry,
    mut events: mpsc::Receiver<ChannelEvent>,
) {
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    // A QR frame means the sidecar is waiting on a fresh scan, so the next
    // Authenticated is a re-pair under a possibly different number, not a
    // plain reconnect.
    let mut pairing = false;

    loop {
        tokio::select! {
            () = &mut shutdown => {
                info!("shutdown signal received, exiting");
                break;
            }
            maybe_event = events.recv() => {
                let Some(event) = maybe_event else {
                    warn!("channel event stream closed, exiting");
                    break;
                };
                handle_event(&pipeline, &registry, &mut pairing, event).await;
            }
        }
    }
}

async fn handle_event(
    pipeline: &ReplyPipeline,
    registry: &SessionRegistry,
    pairing: &mut bool,
    event: ChannelEvent,
) {
    match event {
        ChannelEvent::Qr { .. } => {
            *pairing = true;
            info!("pairing qr issued, scan it with the phone that owns the bot number");
        },
        ChannelEvent::Authenticated => {
            if *pairing {
                *pairing = false;
                // Sessions minted against the previous identity are unsafe
                // to honor; completion and fallback markers stay.
                match registry.purge_sessions().await {
                    Ok(count) => info!(count, "re-paired, purged stale sessions"),
                    Err(e) => warn!(error = %e, "session purge after re-pairing failed"),
                }
            } else {
                info!("channel authenticated");
            }
        },
        ChannelEvent::AuthFailure { error } => {
            error!(error = %error, "channel authentication failed");
        },
        ChannelEvent::Ready => info!("channel ready"),
        ChannelEvent::Message(message) => {
            if let Err(e) = pipeline.handle_message(&message).await {
                warn!(from = %message.from, error = %e, "message handling failed");
            }
        },
        ChannelEvent::Disconnected { reason } => {
            warn!(reason = %reason, "channel disconnected");
        },
        ChannelEvent::SendResult { request_id, .. } => {
            debug!(request_id, "stray send ack");
        },
    }
}

/// Resolves on ctrl-c or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            },
            Err(e) => {
                warn!(error = %e, "sigterm handler unavailable");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use {
        async_trait::async_trait,
        leadline_auto_reply::ManualScheduler,
        leadline_channels::InboundMessage,
        leadline_common::ReplyPayload,
        leadline_directory::MemoryDirectory,
        leadline_store::MemoryStore,
    };

    struct NullOutbound;

    #[async_trait]
    impl ChatOutbound for NullOutbound {
        async fn send_text(&self, _to: &str, _text: &str) -> Result<()> {
            Ok(())
        }

        async fn send_media(&self, _to: &str, _payload: &ReplyPayload) -> Result<()> {
            Ok(())
        }
    }

    fn harness() -> (SessionRegistry, ReplyPipeline) {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let registry = SessionRegistry::new(store, "234");
        let outbound: Arc<dyn ChatOutbound> = Arc::new(NullOutbound);
        let orchestrator = ReplyOrchestrator::new(
            registry.clone(),
            Arc::new(MemoryDirectory::new()),
            Arc::clone(&outbound),
            Arc::new(ManualScheduler::new()),
        );
        let pipeline = ReplyPipeline::new(
            Correlator::new(registry.clone()),
            orchestrator,
            outbound,
        );
        (registry, pipeline)
    }

    #[tokio::test]
    async fn re_pairing_purges_sessions_but_keeps_markers() {
        let (registry, pipeline) = harness();
        let session = registry.create("acme-movers", None).await.unwrap();
        registry
            .claim("2345016065308", &session.session_id)
            .await
            .unwrap();
        registry.mark_completed("2345010000000").await.unwrap();

        let mut pairing = false;
        handle_event(
            &pipeline,
            &registry,
            &mut pairing,
            ChannelEvent::Qr { qr: "code".into() },
        )
        .await;
        assert!(pairing);
        handle_event(&pipeline, &registry, &mut pairing, ChannelEvent::Authenticated).await;
        assert!(!pairing);

        assert!(registry.get(&session.session_id).await.unwrap().is_none());
        assert!(registry.find_claim("2345016065308").await.unwrap().is_none());
        assert!(registry.is_completed("2345010000000").await.unwrap());
    }

    #[tokio::test]
    async fn reconnect_without_a_qr_keeps_sessions() {
        let (registry, pipeline) = harness();
        let session = registry.create("acme-movers", None).await.unwrap();

        let mut pairing = false;
        handle_event(&pipeline, &registry, &mut pairing, ChannelEvent::Authenticated).await;

        assert!(registry.get(&session.session_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn message_events_run_the_reply_pipeline() {
        let (registry, pipeline) = harness();

        let mut pairing = false;
        handle_event(
            &pipeline,
            &registry,
            &mut pairing,
            ChannelEvent::Message(InboundMessage {
                from: "2345559990000@c.us".into(),
                body: "Hello".into(),
                timestamp: None,
            }),
        )
        .await;

        // Unmatched sender got the canned notice and burned its marker.
        assert!(registry.has_fallback("2345559990000").await.unwrap());
    }
}
