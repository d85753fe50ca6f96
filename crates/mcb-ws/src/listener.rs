use crate::Outgoing;
use crate::supervisor::{SEND_BUFFER_SIZE, WsSupervisor};

use mcb_core::{BridgeError, Result};

use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use log::{info, warn};
use percent_encoding::percent_decode_str;
use tokio::sync::{Notify, mpsc};

/// Clean close; the peer will not be dialed back.
pub const CLOSE_NORMAL: u16 = 1000;
/// Rejected handshake: missing identity or bad token.
pub const CLOSE_POLICY_VIOLATION: u16 = 1008;
pub const CLOSE_INTERNAL_ERROR: u16 = 1011;

const IDENTITY_HEADER: &str = "x-self-name";

/// Single-route router for the inbound WebSocket endpoint, mounted at
/// the configured listener path.
pub fn router(supervisor: Arc<WsSupervisor>, path: &str) -> Router {
    Router::new()
        .route(path, get(upgrade_handler))
        .with_state(supervisor)
}

async fn upgrade_handler(
    State(supervisor): State<Arc<WsSupervisor>>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| accept(socket, supervisor, headers))
}

/// Validate the handshake headers of an inbound peer. Identity and
/// token arrive percent-encoded, matching what the outbound side sends.
pub(crate) fn authenticate(headers: &HeaderMap, shared_secret: Option<&str>) -> Result<String> {
    let identity = headers
        .get(IDENTITY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|raw| percent_decode_str(raw).decode_utf8_lossy().into_owned())
        .unwrap_or_default();

    if identity.is_empty() {
        return Err(BridgeError::auth_rejected("Invalid remote name"));
    }

    if let Some(secret) = shared_secret {
        let token = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|raw| percent_decode_str(raw).decode_utf8_lossy().into_owned());

        if token.as_deref() != Some(secret) {
            return Err(BridgeError::auth_rejected("Invalid token"));
        }
    }

    Ok(identity)
}

/// Post-upgrade handling of an inbound peer. WebSocket has no way to
/// refuse an upgrade with a close code before accepting, so rejections
/// happen here as an immediate close frame.
async fn accept(socket: WebSocket, supervisor: Arc<WsSupervisor>, headers: HeaderMap) {
    let identity = match authenticate(&headers, supervisor.listener_password.as_deref()) {
        Ok(identity) => identity,
        Err(e) => {
            warn!("[ws] inbound connection rejected: {}", e);
            close_with(socket, CLOSE_POLICY_VIOLATION, "Invalid handshake").await;
            return;
        }
    };

    let (tx, mut rx) = mpsc::channel::<Outgoing>(SEND_BUFFER_SIZE);
    // Weak clone: the store owns the only strong sender, so dropping it
    // there is enough to close the writer and the socket behind it.
    let session = tx.downgrade();
    match supervisor.store.try_register(&identity, tx).await {
        Ok(()) => {}
        Err(BridgeError::DuplicateIdentity { .. }) => {
            warn!("[ws] {} already connected, rejecting duplicate", identity);
            close_with(socket, CLOSE_NORMAL, "Duplicate connection").await;
            return;
        }
        Err(e) => {
            warn!("[ws] {} registration failed: {}", identity, e);
            close_with(socket, CLOSE_INTERNAL_ERROR, "Internal error").await;
            return;
        }
    }

    info!("[ws] {} connected (inbound)", identity);

    let (mut sink, mut source) = socket.split();

    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let message = match frame {
                Outgoing::Text(text) => Message::Text(text.into()),
                Outgoing::Ping => Message::Ping(Bytes::new()),
            };
            if sink.send(message).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    let pong = Arc::new(Notify::new());
    supervisor.register_pong_signal(&identity, pong.clone()).await;

    while let Some(item) = source.next().await {
        match item {
            Ok(Message::Text(text)) => supervisor.dispatch(&identity, text.to_string()).await,
            Ok(Message::Binary(data)) => match String::from_utf8(data.to_vec()) {
                Ok(text) => supervisor.dispatch(&identity, text).await,
                Err(_) => warn!("[ws] {} sent non-UTF-8 binary frame, ignored", identity),
            },
            Ok(Message::Pong(_)) => pong.notify_one(),
            Ok(Message::Close(frame)) => {
                let code = frame.map_or(CLOSE_NORMAL, |f: CloseFrame| f.code);
                info!("[ws] {} closed with code {}", identity, code);
                break;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("[ws] {} read error: {}", identity, e);
                break;
            }
        }
    }

    info!("[ws] {} disconnected (inbound)", identity);
    // Inbound peers reconnect on their own schedule; never dial back.
    if let Some(handle) = session.upgrade() {
        supervisor.teardown(&identity, &handle, false).await;
    }
}

async fn close_with(mut socket: WebSocket, code: u16, reason: &'static str) {
    let frame = CloseFrame {
        code,
        reason: reason.into(),
    };
    let _ = socket.send(Message::Close(Some(frame))).await;
}
