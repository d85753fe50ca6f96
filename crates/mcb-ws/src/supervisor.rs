use crate::Outgoing;
use crate::listener::CLOSE_NORMAL;

use mcb_config::ServerProfile;
use mcb_core::{
    BridgeError, ConnectionStatus, ConnectionStore, EventSender, InboundEvent, ReconnectPolicy,
    ReconnectRegime, Result,
};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use tokio::net::TcpStream;
use tokio::sync::{Notify, RwLock, mpsc};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{Bytes, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// Handshake + upgrade must complete within this bound.
pub const CONNECT_TIMEOUT_SECS: u64 = 15;

/// Outgoing frames queued per connection before senders block.
pub const SEND_BUFFER_SIZE: usize = 100;

/// Write half of a live WebSocket session. Frames go through the
/// channel into the connection's writer task; `same_channel` doubles as
/// the session identity for stale-teardown checks.
pub type WsHandle = mpsc::Sender<Outgoing>;

type OutboundStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Owns every WebSocket session regardless of direction: outbound
/// clients dialed to WS-enabled server profiles, and inbound peers
/// accepted by the listener under their self-declared name. One store
/// holds both, so a name is live over exactly one socket at a time.
pub struct WsSupervisor {
    pub(crate) store: ConnectionStore<WsHandle>,
    pub(crate) profiles: HashMap<String, ServerProfile>,
    pub(crate) listener_password: Option<String>,
    policy: ReconnectPolicy,
    events: EventSender,
    debug: bool,
    pong_signals: RwLock<HashMap<String, Arc<Notify>>>,
}

impl WsSupervisor {
    pub fn new(
        profiles: Vec<ServerProfile>,
        policy: ReconnectPolicy,
        listener_password: Option<String>,
        events: EventSender,
        debug: bool,
    ) -> Arc<Self> {
        Arc::new(Self {
            store: ConnectionStore::new(),
            profiles: profiles
                .into_iter()
                .map(|p| (p.server_name.clone(), p))
                .collect(),
            listener_password,
            policy,
            events,
            debug,
            pong_signals: RwLock::new(HashMap::new()),
        })
    }

    /// Initial sweep: dial every complete WS profile that is not already
    /// connected (an inbound peer may have claimed the name first).
    pub async fn connect_all(self: &Arc<Self>) {
        for profile in self.profiles.values() {
            if profile.ws_complete() {
                if self.store.handle(&profile.server_name).await.is_some() {
                    info!("[ws] {} already connected, skipping", profile.server_name);
                } else {
                    self.connect(profile).await;
                }
            } else if profile.ws_enabled {
                warn!("[ws] {} profile is incomplete, skipping", profile.server_name);
            }
        }
    }

    /// Guarded outbound connect: a no-op while an attempt is in flight
    /// or the session is live. On failure the reconnect policy takes
    /// over.
    pub async fn connect(self: &Arc<Self>, profile: &ServerProfile) {
        let server = profile.server_name.as_str();

        if !self.store.try_begin_connect(server).await {
            return;
        }

        info!("[ws] connecting to {} ({})", server, profile.ws_url);

        match timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS), dial(profile)).await {
            Ok(Ok(stream)) => {
                info!("[ws] {} connected", server);
                self.adopt_outbound(server, stream).await;
            }
            Ok(Err(e)) => {
                warn!("[ws] {} connect failed: {}", server, e);
                self.store.mark_failed(server).await;
                self.spawn_reconnect(server);
            }
            Err(_) => {
                warn!(
                    "[ws] {} connect timed out after {}s",
                    server, CONNECT_TIMEOUT_SECS
                );
                self.store.mark_failed(server).await;
                self.spawn_reconnect(server);
            }
        }
    }

    /// Split a freshly dialed stream into writer and reader tasks and
    /// register the session. Closes other than a clean 1000 re-enter
    /// the reconnect policy.
    async fn adopt_outbound(self: &Arc<Self>, server: &str, stream: OutboundStream) {
        let (mut sink, mut source) = stream.split();
        let (tx, mut rx) = mpsc::channel::<Outgoing>(SEND_BUFFER_SIZE);

        // Writer drains once every sender is gone, then closes the
        // socket for real.
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
        self.pong_signals
            .write()
            .await
            .insert(server.to_string(), pong.clone());

        // The reader keeps only a weak sender: once the store drops the
        // handle, the writer sees a closed channel and shuts the socket,
        // which in turn ends the reader.
        let identity = tx.downgrade();
        self.store.mark_connected(server, tx).await;

        let supervisor = Arc::clone(self);
        let name = server.to_string();
        tokio::spawn(async move {
            let mut close_code: Option<u16> = None;
            while let Some(item) = source.next().await {
                match item {
                    Ok(Message::Text(text)) => supervisor.dispatch(&name, text.to_string()).await,
                    Ok(Message::Binary(data)) => match String::from_utf8(data.to_vec()) {
                        Ok(text) => supervisor.dispatch(&name, text).await,
                        Err(_) => warn!("[ws] {} sent non-UTF-8 binary frame, ignored", name),
                    },
                    Ok(Message::Pong(_)) => pong.notify_one(),
                    Ok(Message::Close(frame)) => {
                        close_code = Some(frame.map_or(CLOSE_NORMAL, |f| f.code.into()));
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("[ws] {} read error: {}", name, e);
                        break;
                    }
                }
            }

            match close_code {
                Some(code) => info!("[ws] {} closed with code {}", name, code),
                None => info!("[ws] {} connection lost", name),
            }
            // A failed upgrade means the session was already torn down
            // on the store side (manual reconnect, heartbeat), and that
            // path owns the follow-up.
            if let Some(handle) = identity.upgrade() {
                supervisor
                    .teardown(&name, &handle, should_dial_back(close_code))
                    .await;
            }
        });
    }

    /// Forward an inbound payload to the bridge. Lag on the consumer
    /// side drops the event rather than stalling the read loop.
    pub(crate) async fn dispatch(&self, server: &str, payload: String) {
        if self.debug {
            debug!("[ws] {} <- {}", server, payload);
        }
        let event = InboundEvent {
            server_name: server.to_string(),
            payload,
        };
        if self.events.try_send(event).is_err() {
            warn!("[ws] {} inbound event dropped, consumer is behind", server);
        }
    }

    /// Remove the session if `identity` is still the registered handle,
    /// then optionally re-enter the reconnect policy. Stale tasks from
    /// a superseded connection fall through without touching the
    /// replacement.
    pub(crate) async fn teardown(
        self: &Arc<Self>,
        server: &str,
        identity: &WsHandle,
        dial_back: bool,
    ) {
        let taken = self
            .store
            .take_handle_if(server, |h| h.same_channel(identity))
            .await;
        if taken.is_none() {
            return;
        }

        self.pong_signals.write().await.remove(server);

        if dial_back {
            self.spawn_reconnect(server);
        }
    }

    /// Fire-and-forget entry into the reconnect policy. Scheduling runs
    /// on its own task, so connect attempts and teardown paths never
    /// await back into the policy whose timer re-invokes them.
    pub(crate) fn spawn_reconnect(self: &Arc<Self>, server: &str) {
        let supervisor = Arc::clone(self);
        let name = server.to_string();
        tokio::spawn(async move {
            supervisor.schedule_reconnect(&name).await;
        });
    }

    /// Queue a text frame for the live session. Fails fast with
    /// `NotConnected` when there is none.
    pub async fn send(&self, server: &str, payload: String) -> Result<()> {
        let handle = self
            .store
            .handle(server)
            .await
            .ok_or_else(|| BridgeError::not_connected(server))?;

        if self.debug {
            debug!("[ws] {} -> {}", server, payload);
        }

        handle
            .send(Outgoing::Text(payload))
            .await
            .map_err(|_| BridgeError::transport(server, "writer task is gone"))
    }

    /// Manual reconnect: cancel any pending timer, drop the current
    /// session, reset the attempt counter, and dial again. `false` for
    /// unknown or WS-disabled servers.
    pub async fn force_reconnect(self: &Arc<Self>, server: &str) -> bool {
        let Some(profile) = self.profiles.get(server) else {
            error!("[ws] no profile for {}", server);
            return false;
        };

        if !profile.ws_enabled {
            info!("[ws] {} WebSocket is disabled", server);
            return false;
        }

        info!("[ws] manual reconnect for {}", server);

        self.store.abort_reconnect_timer(server).await;
        self.store.take_handle(server).await;
        self.pong_signals.write().await.remove(server);
        self.store.reset_attempts(server).await;

        self.connect(profile).await;
        true
    }

    pub async fn is_connected(&self, server: &str) -> bool {
        self.store.handle(server).await.is_some()
    }

    pub(crate) async fn pong_signal(&self, server: &str) -> Option<Arc<Notify>> {
        self.pong_signals.read().await.get(server).cloned()
    }

    pub(crate) async fn register_pong_signal(&self, server: &str, signal: Arc<Notify>) {
        self.pong_signals
            .write()
            .await
            .insert(server.to_string(), signal);
    }

    /// Read-only projection: every WS-enabled profile plus any inbound
    /// peer connected under a name no profile covers.
    pub async fn status_snapshot(&self) -> HashMap<String, ConnectionStatus> {
        let mut statuses = self.store.snapshot().await;
        for profile in self.profiles.values().filter(|p| p.ws_enabled) {
            statuses
                .entry(profile.server_name.clone())
                .or_insert_with(ConnectionStatus::disconnected);
        }
        statuses
    }

    /// Schedule the next outbound dial per the shared policy. Duplicate
    /// failure signals collapse in the store guard; names without a
    /// WS-enabled profile (inbound peers, disabled transports) park at
    /// `Disconnected`.
    pub(crate) async fn schedule_reconnect(self: &Arc<Self>, server: &str) {
        let Some(profile) = self.profiles.get(server) else {
            return;
        };

        if !profile.ws_enabled {
            info!("[ws] {} WebSocket disabled, reconnect stopped", server);
            self.store.mark_disconnected(server).await;
            return;
        }

        let Some(attempts) = self.store.try_schedule_reconnect(server).await else {
            return;
        };

        let max_attempts = profile.ws_max_attempts;
        let delay = self.policy.delay(attempts, max_attempts);

        match self.policy.regime(attempts, max_attempts) {
            ReconnectRegime::ShortTerm => info!(
                "[ws] {} reconnecting in {}s (attempt {}/{})",
                server,
                delay.as_secs(),
                attempts,
                max_attempts
            ),
            ReconnectRegime::LongTerm => info!(
                "[ws] {} in long-term reconnect, retrying in {}s",
                server,
                delay.as_secs()
            ),
        }

        let supervisor = Arc::clone(self);
        let name = server.to_string();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            supervisor.store.take_reconnect_timer(&name).await;

            // Profile may have been disabled while the timer was armed.
            let Some(profile) = supervisor.profiles.get(&name) else {
                return;
            };
            if !profile.ws_enabled {
                supervisor.store.mark_disconnected(&name).await;
                return;
            }

            supervisor.connect(profile).await;
        });

        self.store.set_reconnect_timer(server, timer).await;
    }
}

/// Whether a finished session warrants dialing the server back. Only a
/// clean close (1000) suppresses the reconnect; any other close code,
/// or none at all (stream ended, transport error), re-enters the
/// policy.
pub(crate) fn should_dial_back(close_code: Option<u16>) -> bool {
    close_code != Some(CLOSE_NORMAL)
}

/// Build the upgrade request with identity and auth headers and dial.
/// Non-ASCII names and tokens ride percent-encoded.
async fn dial(profile: &ServerProfile) -> Result<OutboundStream> {
    let server = profile.server_name.as_str();

    let mut request = profile
        .ws_url
        .as_str()
        .into_client_request()
        .map_err(|e| BridgeError::transport(server, e.to_string()))?;

    let identity = utf8_percent_encode(server, NON_ALPHANUMERIC).to_string();
    let headers = request.headers_mut();
    headers.insert(
        "X-Self-Name",
        HeaderValue::from_str(&identity)
            .map_err(|e| BridgeError::transport(server, e.to_string()))?,
    );
    if let Some(token) = &profile.ws_password {
        let bearer = format!(
            "Bearer {}",
            utf8_percent_encode(token, NON_ALPHANUMERIC)
        );
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&bearer)
                .map_err(|e| BridgeError::transport(server, e.to_string()))?,
        );
    }

    let (stream, _response) = connect_async(request)
        .await
        .map_err(|e| BridgeError::transport(server, e.to_string()))?;
    Ok(stream)
}
