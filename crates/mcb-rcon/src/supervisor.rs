use mcb_config::ServerProfile;
use mcb_core::{BridgeError, ConnectionStatus, ConnectionStore, ReconnectPolicy, ReconnectRegime, Result};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;

/// Connect + auth must complete within this bound.
pub const CONNECT_TIMEOUT_SECS: u64 = 15;

/// Live RCON session. The protocol is strictly request/response, so the
/// mutex serializes callers (including the heartbeat) onto the wire.
pub type RconHandle = Arc<Mutex<rcon::Connection<TcpStream>>>;

/// Owns one outbound RCON session per RCON-enabled server profile:
/// establishment, teardown, reconnection with backoff, and command
/// forwarding for external callers.
pub struct RconSupervisor {
    pub(crate) store: ConnectionStore<RconHandle>,
    pub(crate) profiles: HashMap<String, ServerProfile>,
    policy: ReconnectPolicy,
}

impl RconSupervisor {
    pub fn new(profiles: Vec<ServerProfile>, policy: ReconnectPolicy) -> Arc<Self> {
        Arc::new(Self {
            store: ConnectionStore::new(),
            profiles: profiles
                .into_iter()
                .map(|p| (p.server_name.clone(), p))
                .collect(),
            policy,
        })
    }

    /// Initial sweep: dial every complete RCON profile that is not
    /// already connected. Incomplete-but-enabled profiles are skipped
    /// with a warning.
    pub async fn connect_all(self: &Arc<Self>) {
        for profile in self.profiles.values() {
            if profile.rcon_complete() {
                if self.store.handle(&profile.server_name).await.is_some() {
                    info!(
                        "[rcon] {} already connected, skipping",
                        profile.server_name
                    );
                } else {
                    self.connect(profile).await;
                }
            } else if profile.rcon_enabled {
                warn!(
                    "[rcon] {} profile is incomplete, skipping",
                    profile.server_name
                );
            }
        }
    }

    /// Guarded connect: a no-op while an attempt is in flight or the
    /// session is live. On failure the reconnect policy takes over.
    pub async fn connect(self: &Arc<Self>, profile: &ServerProfile) {
        let server = profile.server_name.as_str();

        if !self.store.try_begin_connect(server).await {
            return;
        }

        info!("[rcon] connecting to {} ({})", server, profile.rcon_addr());

        let dial = <rcon::Connection<TcpStream>>::builder()
            .enable_minecraft_quirks(true)
            .connect(profile.rcon_addr(), &profile.rcon_password);

        match timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS), dial).await {
            Ok(Ok(connection)) => {
                info!("[rcon] {} connected", server);
                self.store
                    .mark_connected(server, Arc::new(Mutex::new(connection)))
                    .await;
            }
            Ok(Err(e)) => {
                warn!("[rcon] {} connect failed: {}", server, e);
                self.store.mark_failed(server).await;
                self.spawn_reconnect(server);
            }
            Err(_) => {
                warn!(
                    "[rcon] {} connect timed out after {}s",
                    server, CONNECT_TIMEOUT_SECS
                );
                self.store.mark_failed(server).await;
                self.spawn_reconnect(server);
            }
        }
    }

    /// Teardown after an unexpected loss of the session, observed at a
    /// failed send or heartbeat. Redundant calls are no-ops.
    pub async fn handle_drop(self: &Arc<Self>, server: &str) {
        if self.store.take_handle(server).await.is_some() {
            info!("[rcon] {} connection dropped", server);
        }
        self.spawn_reconnect(server);
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

    /// Forward a command to the live session. Fails fast with
    /// `NotConnected` when there is none; retry policy stays with the
    /// caller. A transport failure tears the session down.
    pub async fn send(self: &Arc<Self>, server: &str, command: &str) -> Result<String> {
        let handle = self
            .store
            .handle(server)
            .await
            .ok_or_else(|| BridgeError::not_connected(server))?;

        let mut connection = handle.lock().await;
        match connection.cmd(command).await {
            Ok(response) => Ok(response),
            Err(e) => {
                drop(connection);
                warn!("[rcon] {} send failed: {}", server, e);
                self.handle_drop(server).await;
                Err(BridgeError::transport(server, e.to_string()))
            }
        }
    }

    /// Manual reconnect: cancel any pending timer, drop the current
    /// session, reset the attempt counter, and dial again. `false` for
    /// unknown or RCON-disabled servers.
    pub async fn force_reconnect(self: &Arc<Self>, server: &str) -> bool {
        let Some(profile) = self.profiles.get(server) else {
            error!("[rcon] no profile for {}", server);
            return false;
        };

        if !profile.rcon_enabled {
            info!("[rcon] {} RCON is disabled", server);
            return false;
        }

        info!("[rcon] manual reconnect for {}", server);

        self.store.abort_reconnect_timer(server).await;
        self.store.take_handle(server).await;
        self.store.reset_attempts(server).await;

        self.connect(profile).await;
        true
    }

    pub async fn is_connected(&self, server: &str) -> bool {
        self.store.handle(server).await.is_some()
    }

    /// Read-only projection over every RCON-enabled profile.
    pub async fn status_snapshot(&self) -> HashMap<String, ConnectionStatus> {
        let mut states = self.store.snapshot().await;
        self.profiles
            .values()
            .filter(|p| p.rcon_enabled)
            .map(|p| {
                let status = states
                    .remove(&p.server_name)
                    .unwrap_or_else(ConnectionStatus::disconnected);
                (p.server_name.clone(), status)
            })
            .collect()
    }

    /// Schedule the next reconnect attempt per the shared policy.
    /// Duplicate failure signals collapse in the store guard; a
    /// disabled transport parks the connection at `Disconnected`.
    pub(crate) async fn schedule_reconnect(self: &Arc<Self>, server: &str) {
        let Some(profile) = self.profiles.get(server) else {
            return;
        };

        if !profile.rcon_enabled {
            info!("[rcon] {} RCON disabled, reconnect stopped", server);
            self.store.mark_disconnected(server).await;
            return;
        }

        let Some(attempts) = self.store.try_schedule_reconnect(server).await else {
            return;
        };

        let max_attempts = profile.rcon_max_attempts;
        let delay = self.policy.delay(attempts, max_attempts);

        match self.policy.regime(attempts, max_attempts) {
            ReconnectRegime::ShortTerm => info!(
                "[rcon] {} reconnecting in {}s (attempt {}/{})",
                server,
                delay.as_secs(),
                attempts,
                max_attempts
            ),
            ReconnectRegime::LongTerm => info!(
                "[rcon] {} in long-term reconnect, retrying in {}s",
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
            if !profile.rcon_enabled {
                supervisor.store.mark_disconnected(&name).await;
                return;
            }

            supervisor.connect(profile).await;
        });

        self.store.set_reconnect_timer(server, timer).await;
    }
}
