//! WebSocket connection loop.
//!
//! Each connection owns a bounded outbound queue. The dispatcher fills it
//! with `try_send`; this loop drains it onto the socket, so a slow socket
//! only ever delays its own readings.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use super::messages::{ClientCommand, ServerEvent, parse_command};
use crate::domain::{ConnectionHandle, ConnectionId, SubscriptionRegistry};

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Applies subscribe/unsubscribe commands to the registry.
/// - Forwards queued readings to the client as `sensor-data` frames.
///
/// On exit the connection's subscriptions are dropped before returning.
pub async fn run_connection(
    socket: WebSocket,
    registry: Arc<SubscriptionRegistry>,
    buffer: usize,
) {
    let id = ConnectionId::new();
    let (queue_tx, mut queue_rx) = mpsc::channel(buffer.max(1));
    let handle = ConnectionHandle::new(id, queue_tx);
    let (mut ws_tx, mut ws_rx) = socket.split();

    tracing::info!(connection_id = %id, "ws client connected");

    loop {
        tokio::select! {
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_text_message(&text, &handle, &registry).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(connection_id = %id, error = %e, "ws read failed");
                        break;
                    }
                    _ => {}
                }
            }
            // Reading queued by the dispatcher
            Some(reading) = queue_rx.recv() => {
                let json = match serde_json::to_string(&ServerEvent::SensorData(&reading)) {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::warn!(connection_id = %id, error = %e, "failed to encode reading");
                        continue;
                    }
                };
                if ws_tx.send(Message::text(json)).await.is_err() {
                    break;
                }
            }
        }
    }

    let released = registry.drop_connection(id).await;
    tracing::info!(connection_id = %id, released, "ws client disconnected");
}

/// Applies one client frame. Bad frames are logged and ignored.
async fn handle_text_message(
    text: &str,
    handle: &ConnectionHandle,
    registry: &SubscriptionRegistry,
) {
    let id = handle.id();
    let command = match parse_command(text) {
        Ok(command) => command,
        Err(e) => {
            tracing::debug!(connection_id = %id, error = %e, "ignoring ws frame");
            return;
        }
    };

    match command {
        ClientCommand::Subscribe(target) => match target.to_key() {
            Ok(key) => {
                let added = registry.subscribe(handle, key.clone()).await;
                tracing::info!(connection_id = %id, %key, added, "subscribed");
            }
            Err(e) => tracing::warn!(connection_id = %id, error = %e, "ignoring subscribe"),
        },
        ClientCommand::Unsubscribe(target) => match target.to_key() {
            Ok(key) => {
                let removed = registry.unsubscribe(id, &key).await;
                tracing::info!(connection_id = %id, %key, removed, "unsubscribed");
            }
            Err(e) => tracing::warn!(connection_id = %id, error = %e, "ignoring unsubscribe"),
        },
    }
}
