//! WebSocket client for the pairing sidecar.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use {
    anyhow::{Context, Result, bail},
    futures::{SinkExt, StreamExt},
    tokio::sync::{mpsc, oneshot},
    tokio_tungstenite::{connect_async, tungstenite::Message},
    tracing::{debug, info, warn},
};

use crate::types::{ChannelEvent, SidecarCommand};

/// How long a send waits for its ack before counting as failed.
const ACK_TIMEOUT: Duration = Duration::from_secs(30);
/// Delay between connect attempts while the sidecar process starts up.
const RECONNECT_DELAY: Duration = Duration::from_secs(1);
const COMMAND_BUFFER: usize = 64;

/// Result of one acknowledged send.
#[derive(Debug, Clone)]
pub struct SendAck {
    pub success: bool,
    pub error: Option<String>,
}

/// Table of sends awaiting their `SendResult` frame.
#[derive(Default, Clone)]
struct PendingAcks {
    inner: Arc<Mutex<HashMap<String, oneshot::Sender<SendAck>>>>,
}

impl PendingAcks {
    fn register(&self, request_id: &str) -> oneshot::Receiver<SendAck> {
        let (tx, rx) = oneshot::channel();
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.insert(request_id.to_string(), tx);
        rx
    }

    fn resolve(&self, request_id: &str, ack: SendAck) {
        let tx = {
            let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            inner.remove(request_id)
        };
        match tx {
            Some(tx) => {
                let _ = tx.send(ack);
            },
            None => debug!(request_id, "ack for unknown or abandoned send"),
        }
    }

    fn abandon(&self, request_id: &str) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.remove(request_id);
    }

    /// Fail every waiter; called when the link goes down.
    fn fail_all(&self, reason: &str) {
        let drained: Vec<_> = {
            let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            inner.drain().collect()
        };
        for (_, tx) in drained {
            let _ = tx.send(SendAck {
                success: false,
                error: Some(reason.to_string()),
            });
        }
    }
}

/// Writer half of the sidecar link plus the pending-ack table.
///
/// Cloneable; all clones share one socket and one ack table.
#[derive(Clone)]
pub struct SidecarHandle {
    commands: mpsc::Sender<SidecarCommand>,
    pending: PendingAcks,
}

impl SidecarHandle {
    /// Send a command and wait for the sidecar to acknowledge it.
    pub async fn send(&self, command: SidecarCommand) -> Result<()> {
        let request_id = command.request_id().to_string();
        let ack_rx = self.pending.register(&request_id);
        if self.commands.send(command).await.is_err() {
            self.pending.abandon(&request_id);
            bail!("sidecar link is down");
        }
        match tokio::time::timeout(ACK_TIMEOUT, ack_rx).await {
            Ok(Ok(ack)) if ack.success => Ok(()),
            Ok(Ok(ack)) => bail!(
                "sidecar send failed: {}",
                ack.error.as_deref().unwrap_or("unknown error")
            ),
            Ok(Err(_)) => bail!("sidecar link dropped before acknowledging send"),
            Err(_) => {
                self.pending.abandon(&request_id);
                bail!("sidecar send timed out after {}s", ACK_TIMEOUT.as_secs())
            },
        }
    }
}

/// Connect to the sidecar, retrying while its process starts up.
///
/// Frames from the sidecar flow to `events` in arrival order; `SendResult`
/// acks are resolved against in-flight sends instead of being forwarded.
/// When the link drops, waiters fail and a final `Disconnected` event is
/// emitted.
pub async fn connect_with_retry(
    url: &str,
    events: mpsc::Sender<ChannelEvent>,
    max_attempts: u32,
) -> Result<SidecarHandle> {
    let mut attempt = 0;
    let (ws, _) = loop {
        match connect_async(url).await {
            Ok(ok) => break ok,
            Err(e) if attempt + 1 < max_attempts => {
                attempt += 1;
                debug!(url, attempt, error = %e, "sidecar not reachable yet, retrying");
                tokio::time::sleep(RECONNECT_DELAY).await;
            },
            Err(e) => {
                return Err(e).with_context(|| format!("failed to connect to sidecar at {url}"));
            },
        }
    };
    info!(url, "connected to sidecar");

    let (mut write, mut read) = ws.split();
    let (commands, mut command_rx) = mpsc::channel::<SidecarCommand>(COMMAND_BUFFER);
    let pending = PendingAcks::default();

    tokio::spawn(async move {
        while let Some(command) = command_rx.recv().await {
            let frame = match serde_json::to_string(&command) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(error = %e, "failed to encode sidecar command");
                    continue;
                },
            };
            if let Err(e) = write.send(Message::text(frame)).await {
                warn!(error = %e, "sidecar write failed");
                break;
            }
        }
    });

    let reader_pending = pending.clone();
    tokio::spawn(async move {
        while let Some(frame) = read.next().await {
            let text = match frame {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(close)) => {
                    debug!(?close, "sidecar closed the link");
                    break;
                },
                Ok(_) => continue,
                Err(e) => {
                    warn!(error = %e, "sidecar read failed");
                    break;
                },
            };
            let event = match serde_json::from_str::<ChannelEvent>(&text) {
                Ok(event) => event,
                Err(e) => {
                    warn!(error = %e, "unrecognized sidecar frame");
                    continue;
                },
            };
            match event {
                ChannelEvent::SendResult {
                    request_id,
                    success,
                    error,
                } => {
                    reader_pending.resolve(&request_id, SendAck { success, error });
                },
                other => {
                    if events.send(other).await.is_err() {
                        break;
                    }
                },
            }
        }
        reader_pending.fail_all("sidecar link closed");
        let _ = events
            .send(ChannelEvent::Disconnected {
                reason: "sidecar link closed".into(),
            })
            .await;
    });

    Ok(SidecarHandle { commands, pending })
}
