//! Change feed over WebSocket.
//!
//! `GET /ws/changes` upgrades to a WebSocket that pushes one JSON frame per
//! store mutation, so patient, doctor and admin views refresh without
//! polling. Frames are `StoreEvent`s (tagged by `kind`), plus:
//! - `{"kind":"hello", ...}` once on connect
//! - `{"kind":"resync","missed":n}` when this subscriber fell behind and
//!   must refetch the collection
//!
//! A ping goes out every 30s; the connection closes when the client does.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};

use crate::api::types::ApiContext;
use crate::core_state::CoreState;
use crate::store::StoreEvent;

/// Ping interval for idle connections.
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Outgoing frames buffered per connection before the socket writer.
const OUTGOING_BUFFER: usize = 64;

/// WebSocket upgrade handler.
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(ctx): State<ApiContext>) -> impl IntoResponse {
    let core = ctx.core.clone();
    ws.on_upgrade(move |socket| handle_ws(socket, core))
}

async fn handle_ws(socket: WebSocket, core: Arc<CoreState>) {
    // Subscribe before the hello frame so no mutation after it is missed.
    let mut events = core.store().subscribe();
    let (ws_sink, mut ws_stream) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Message>(OUTGOING_BUFFER);

    let sender_handle = tokio::spawn(async move {
        let mut sink = ws_sink;
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    let hello = serde_json::json!({
        "kind": "hello",
        "storage": core.store().backend_name(),
        "serverTime": chrono::Utc::now().to_rfc3339(),
    });
    let _ = tx.send(Message::Text(hello.to_string())).await;

    tracing::info!("Change feed client connected");

    let mut ping = tokio::time::interval(PING_INTERVAL);
    ping.tick().await;

    loop {
        tokio::select! {
            event = events.recv() => {
                let frame = match event {
                    Ok(event) => match event_frame(&event) {
                        Some(frame) => frame,
                        None => continue,
                    },
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "Change feed subscriber lagged");
                        serde_json::json!({ "kind": "resync", "missed": missed }).to_string()
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                if tx.send(Message::Text(frame)).await.is_err() {
                    break;
                }
            }
            msg = ws_stream.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    // The feed is push-only; client text is ignored.
                    _ => {}
                }
            }
            _ = ping.tick() => {
                if tx.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }
        }
    }

    drop(tx);
    let _ = sender_handle.await;

    tracing::info!("Change feed client disconnected");
}

fn event_frame(event: &StoreEvent) -> Option<String> {
    match serde_json::to_string(event) {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize store event");
            None
        }
    }
}
