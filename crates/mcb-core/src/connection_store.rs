use crate::{BridgeError, ConnectionState, ConnectionStatus, Result};

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Per-server connection record for one transport.
///
/// Invariants enforced here rather than by callers:
/// - `handle` is `Some` iff `state == Connected`
/// - at most one pending reconnect timer per server
struct ConnectionEntry<H> {
    state: ConnectionState,
    handle: Option<H>,
    reconnect_attempts: u32,
    reconnect_timer: Option<JoinHandle<()>>,
}

impl<H> Default for ConnectionEntry<H> {
    fn default() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            handle: None,
            reconnect_attempts: 0,
            reconnect_timer: None,
        }
    }
}

/// Shared state store for one transport's connections, keyed by server
/// name. Both supervisors own one instance each; guard checks and state
/// transitions happen under a single write lock so concurrent failure
/// signals cannot race each other into duplicate connect attempts or
/// duplicate timers.
pub struct ConnectionStore<H> {
    inner: Arc<RwLock<HashMap<String, ConnectionEntry<H>>>>,
}

impl<H> ConnectionStore<H> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Guarded entry into the `Connecting` state. Returns `false` (and
    /// changes nothing) when a connect attempt is already in flight or
    /// the connection is live.
    pub async fn try_begin_connect(&self, server: &str) -> bool {
        let mut inner = self.inner.write().await;
        let entry = inner.entry(server.to_string()).or_default();
        match entry.state {
            ConnectionState::Connecting | ConnectionState::Connected => false,
            _ => {
                entry.state = ConnectionState::Connecting;
                true
            }
        }
    }

    /// Store a live handle. Resets the attempt counter — any successful
    /// connect ends the current backoff run.
    pub async fn mark_connected(&self, server: &str, handle: H) {
        let mut inner = self.inner.write().await;
        let entry = inner.entry(server.to_string()).or_default();
        entry.state = ConnectionState::Connected;
        entry.handle = Some(handle);
        entry.reconnect_attempts = 0;
    }

    /// Register an inbound connection. The first connection holds the
    /// slot; a second one under the same name is rejected.
    pub async fn try_register(&self, server: &str, handle: H) -> Result<()> {
        let mut inner = self.inner.write().await;
        let entry = inner.entry(server.to_string()).or_default();
        if entry.handle.is_some() {
            return Err(BridgeError::duplicate_identity(server));
        }
        entry.state = ConnectionState::Connected;
        entry.handle = Some(handle);
        entry.reconnect_attempts = 0;
        Ok(())
    }

    pub async fn mark_disconnected(&self, server: &str) {
        let mut inner = self.inner.write().await;
        let entry = inner.entry(server.to_string()).or_default();
        entry.state = ConnectionState::Disconnected;
        entry.handle = None;
    }

    pub async fn mark_failed(&self, server: &str) {
        let mut inner = self.inner.write().await;
        let entry = inner.entry(server.to_string()).or_default();
        entry.state = ConnectionState::Failed;
        entry.handle = None;
    }

    /// Remove the live handle and transition to `Disconnected`.
    /// Returns `None` when there was nothing to tear down, which makes
    /// redundant teardown (heartbeat racing the reconnect policy) a
    /// harmless no-op.
    pub async fn take_handle(&self, server: &str) -> Option<H> {
        self.take_handle_if(server, |_| true).await
    }

    /// Like [`Self::take_handle`], but only when `pred` accepts the
    /// stored handle. Lets a stale connection task verify the handle it
    /// is reporting about is still the registered one.
    pub async fn take_handle_if<F>(&self, server: &str, pred: F) -> Option<H>
    where
        F: FnOnce(&H) -> bool,
    {
        let mut inner = self.inner.write().await;
        let entry = inner.get_mut(server)?;
        match &entry.handle {
            Some(handle) if pred(handle) => {
                entry.state = ConnectionState::Disconnected;
                entry.handle.take()
            }
            _ => None,
        }
    }

    pub async fn state(&self, server: &str) -> ConnectionState {
        let inner = self.inner.read().await;
        inner
            .get(server)
            .map(|e| e.state)
            .unwrap_or(ConnectionState::Disconnected)
    }

    pub async fn reset_attempts(&self, server: &str) {
        let mut inner = self.inner.write().await;
        if let Some(entry) = inner.get_mut(server) {
            entry.reconnect_attempts = 0;
        }
    }

    /// Guarded start of a reconnect cycle. Increments the attempt
    /// counter and transitions to `Reconnecting`, returning the new
    /// attempt count. Returns `None` when a timer is already pending or
    /// an attempt is in flight — duplicate failure signals collapse
    /// into one scheduled reconnect.
    pub async fn try_schedule_reconnect(&self, server: &str) -> Option<u32> {
        let mut inner = self.inner.write().await;
        let entry = inner.entry(server.to_string()).or_default();
        if entry.reconnect_timer.is_some() {
            return None;
        }
        if matches!(
            entry.state,
            ConnectionState::Connecting | ConnectionState::Reconnecting
        ) {
            return None;
        }
        entry.reconnect_attempts += 1;
        entry.state = ConnectionState::Reconnecting;
        Some(entry.reconnect_attempts)
    }

    /// Attach the timer task for a scheduled reconnect. Replacing an
    /// existing timer aborts it first, preserving the at-most-one
    /// invariant even if a caller slips past the schedule guard.
    pub async fn set_reconnect_timer(&self, server: &str, timer: JoinHandle<()>) {
        let mut inner = self.inner.write().await;
        let entry = inner.entry(server.to_string()).or_default();
        if let Some(stale) = entry.reconnect_timer.replace(timer) {
            stale.abort();
        }
    }

    /// Detach the timer reference without aborting — called by the
    /// timer task itself when it fires.
    pub async fn take_reconnect_timer(&self, server: &str) -> Option<JoinHandle<()>> {
        let mut inner = self.inner.write().await;
        inner.get_mut(server)?.reconnect_timer.take()
    }

    /// Synchronously invalidate a pending reconnect so a stale timer
    /// cannot fire after an explicit teardown.
    pub async fn abort_reconnect_timer(&self, server: &str) {
        let mut inner = self.inner.write().await;
        if let Some(entry) = inner.get_mut(server)
            && let Some(timer) = entry.reconnect_timer.take()
        {
            timer.abort();
        }
    }

    pub async fn snapshot(&self) -> HashMap<String, ConnectionStatus> {
        let inner = self.inner.read().await;
        inner
            .iter()
            .map(|(name, entry)| {
                (
                    name.clone(),
                    ConnectionStatus {
                        state: entry.state,
                        connected: entry.handle.is_some(),
                        reconnect_attempts: entry.reconnect_attempts,
                        has_pending_timer: entry.reconnect_timer.is_some(),
                    },
                )
            })
            .collect()
    }
}

impl<H: Clone> ConnectionStore<H> {
    pub async fn handle(&self, server: &str) -> Option<H> {
        let inner = self.inner.read().await;
        inner.get(server).and_then(|e| e.handle.clone())
    }

    /// All live handles, for the heartbeat monitors.
    pub async fn handles(&self) -> Vec<(String, H)> {
        let inner = self.inner.read().await;
        inner
            .iter()
            .filter_map(|(name, entry)| entry.handle.clone().map(|h| (name.clone(), h)))
            .collect()
    }
}

impl<H> Default for ConnectionStore<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> Clone for ConnectionStore<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
