mod heartbeat;
mod listener;
mod outgoing;
mod supervisor;

pub use heartbeat::{
    DEGRADED_LATENCY_SECS, HEARTBEAT_INTERVAL_SECS, PONG_TIMEOUT_SECS, spawn_heartbeat,
};
pub use listener::{CLOSE_INTERNAL_ERROR, CLOSE_NORMAL, CLOSE_POLICY_VIOLATION, router};
pub use outgoing::Outgoing;
pub use supervisor::{CONNECT_TIMEOUT_SECS, SEND_BUFFER_SIZE, WsHandle, WsSupervisor};

#[cfg(test)]
mod tests;
