use crate::ConnectionState;

use serde::Serialize;

/// Read-only projection of one connection's state, for status reporting.
/// `connected` reflects handle presence, not `state` — a lingering
/// reconnect timer never makes a dead connection look alive.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    pub connected: bool,
    pub reconnect_attempts: u32,
    pub has_pending_timer: bool,
}

impl ConnectionStatus {
    /// Status for a configured server the supervisor has not touched yet.
    pub fn disconnected() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            connected: false,
            reconnect_attempts: 0,
            has_pending_timer: false,
        }
    }
}
