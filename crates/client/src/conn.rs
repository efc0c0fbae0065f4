// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hub connection manager.
//!
//! Owns the one process-wide WebSocket to the event hub in a background
//! task: connects, broadcasts inbound text frames to every subscribed
//! workflow driver, writes outbound control frames, and reconnects with
//! a fixed backoff when the socket drops. The handle exposes fail-fast
//! sends and a `watch` signal for the connected flag; subscriptions are
//! NOT replayed on reconnect, that is the registry's call.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::error::ClientError;

const OUTBOUND_BUFFER: usize = 64;
const INBOUND_BUFFER: usize = 256;

/// Handle to the background hub connection.
#[derive(Clone)]
pub struct Connection {
    outbound: mpsc::Sender<String>,
    frames: broadcast::Sender<String>,
    connected: watch::Receiver<bool>,
}

impl Connection {
    /// Spawn the connection task. Returns the handle and a shutdown
    /// trigger (dropping it also shuts down).
    pub fn spawn(url: String, reconnect_delay: Duration) -> (Connection, oneshot::Sender<()>) {
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_BUFFER);
        let (frames_tx, _) = broadcast::channel(INBOUND_BUFFER);
        let (connected_tx, connected_rx) = watch::channel(false);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(connection_task(
            url,
            reconnect_delay,
            outbound_rx,
            frames_tx.clone(),
            connected_tx,
            shutdown_rx,
        ));

        let conn = Connection { outbound: outbound_tx, frames: frames_tx, connected: connected_rx };
        (conn, shutdown_tx)
    }

    /// Subscribe to the inbound frame stream. Every workflow driver gets
    /// its own receiver; frames for channels a driver does not own are
    /// dropped by its reducer.
    pub fn frames(&self) -> broadcast::Receiver<String> {
        self.frames.subscribe()
    }

    /// Send a text frame, failing immediately when the hub is down.
    /// Nothing is queued across a disconnect.
    pub fn try_send(&self, frame: String) -> Result<(), ClientError> {
        if !*self.connected.borrow() {
            return Err(ClientError::Disconnected);
        }
        self.outbound.try_send(frame).map_err(|_| ClientError::Disconnected)
    }

    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    /// Watch the connected flag, e.g. to gate job-start buttons.
    pub fn connected_signal(&self) -> watch::Receiver<bool> {
        self.connected.clone()
    }
}

/// Background task: connect, bridge frames, reconnect on drop.
async fn connection_task(
    url: String,
    reconnect_delay: Duration,
    mut outbound_rx: mpsc::Receiver<String>,
    frames_tx: broadcast::Sender<String>,
    connected_tx: watch::Sender<bool>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    loop {
        let ws_stream = tokio::select! {
            res = connect_async(url.as_str()) => match res {
                Ok((stream, _)) => {
                    tracing::info!(%url, "hub connected");
                    stream
                }
                Err(e) => {
                    tracing::warn!(%url, %e, "hub connect failed, retrying");
                    tokio::select! {
                        _ = tokio::time::sleep(reconnect_delay) => continue,
                        _ = &mut shutdown_rx => return,
                    }
                }
            },
            _ = &mut shutdown_rx => return,
        };

        let _ = connected_tx.send(true);
        let (mut write, mut read) = ws_stream.split();

        // Drop frames queued before the previous disconnect was observed;
        // a fresh socket must not replay stale control frames.
        while outbound_rx.try_recv().is_ok() {}

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            // No subscribers is fine; frames are simply lost,
                            // same as before any driver existed.
                            let _ = frames_tx.send(text.to_string());
                        }
                        Some(Ok(Message::Close(frame))) => {
                            tracing::info!(?frame, "hub sent close frame");
                            break;
                        }
                        None => {
                            tracing::info!("hub stream ended");
                            break;
                        }
                        Some(Err(e)) => {
                            tracing::warn!(%e, "hub read error");
                            break;
                        }
                        _ => {} // Ping/Pong/Binary — ignore
                    }
                }
                frame = outbound_rx.recv() => {
                    match frame {
                        Some(text) => {
                            if let Err(e) = write.send(Message::text(text)).await {
                                tracing::warn!(%e, "hub write failed");
                                break;
                            }
                        }
                        None => {
                            // All handles dropped.
                            let _ = connected_tx.send(false);
                            return;
                        }
                    }
                }
                _ = &mut shutdown_rx => {
                    let _ = write.send(Message::Close(None)).await;
                    let _ = connected_tx.send(false);
                    return;
                }
            }
        }

        let _ = connected_tx.send(false);
        tracing::info!(delay_ms = reconnect_delay.as_millis() as u64, "hub reconnecting");
        tokio::select! {
            _ = tokio::time::sleep(reconnect_delay) => {}
            _ = &mut shutdown_rx => return,
        }
    }
}
