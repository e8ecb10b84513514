//! WebSocket bridge between external clients and the internal [`EventBus`].
//!
//! This module provides [`WsBridge`], which:
//!
//! 1. **Mirrors** every [`Envelope`] published on the bus to each connected
//!    client as a JSON text frame (`{"id", "timestamp", "topic", "payload"}`).
//!
//! 2. **Ingests** client publish frames of the form
//!    `{"topic": "seatadjuster/setPosition/request", "payload": {...}}` and
//!    republishes them on the bus. `payload` may be a JSON string (forwarded
//!    verbatim) or any other JSON value (re-serialized).
//!
//! The bridge is agnostic about the *meaning* of the data it routes; it only
//! handles serialisation and transport.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use seat_types::SeatError;
use serde::Deserialize;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, warn};

use crate::bus::EventBus;

/// A publish request sent by an external client.
#[derive(Debug, Deserialize)]
struct InboundFrame {
    topic: String,
    payload: serde_json::Value,
}

/// Bridge between WebSocket clients and the internal [`EventBus`].
#[derive(Clone)]
pub struct WsBridge {
    bus: EventBus,
}

impl WsBridge {
    /// Create a new bridge backed by `bus`.
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }

    /// Serve clients on an already-bound listener. Accept errors are logged;
    /// the loop never returns on its own.
    pub async fn serve(self, listener: TcpListener) -> Result<(), SeatError> {
        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    let bridge = self.clone();
                    tokio::spawn(async move {
                        if let Err(e) = bridge.handle_ws_client(stream, peer).await {
                            error!(peer = %peer, error = %e, "ws client error");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "ws accept error");
                }
            }
        }
    }

    async fn handle_ws_client(&self, stream: TcpStream, peer: SocketAddr) -> Result<(), SeatError> {
        let ws_stream = accept_async(stream)
            .await
            .map_err(|e| SeatError::Transport(format!("ws handshake from {peer}: {e}")))?;
        debug!(peer = %peer, "ws client connected");

        let (mut ws_tx, mut ws_rx) = ws_stream.split();
        let mut rx = self.bus.subscribe_all();

        loop {
            tokio::select! {
                result = rx.recv() => {
                    match result {
                        Ok(envelope) => {
                            let json = serde_json::to_string(&envelope)
                                .map_err(|e| SeatError::Serialization(e.to_string()))?;
                            if ws_tx.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                            warn!(peer = %peer, lagged_by = n, "ws client lagged");
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    }
                }
                msg = ws_rx.next() => {
                    match msg {
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Err(_)) => break,
                        Some(Ok(Message::Text(text))) => {
                            if let Err(e) = self.handle_incoming_ws_message(text.as_str()) {
                                warn!(peer = %peer, error = %e, "dropping ws frame");
                            }
                        }
                        _ => {}
                    }
                }
            }
        }

        debug!(peer = %peer, "ws client disconnected");
        Ok(())
    }

    /// Parse a client publish frame and republish it on the bus.
    ///
    /// Returns the number of topic subscribers reached.
    fn handle_incoming_ws_message(&self, text: &str) -> Result<usize, SeatError> {
        let frame: InboundFrame = serde_json::from_str(text)
            .map_err(|e| SeatError::Transport(format!("malformed ws frame: {e}")))?;
        let payload = match frame.payload {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        self.bus.publish(&frame.topic, payload)
    }
}
