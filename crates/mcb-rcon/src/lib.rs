mod heartbeat;
mod supervisor;

pub use heartbeat::{
    DEGRADED_LATENCY_SECS, HEARTBEAT_INTERVAL_SECS, HEARTBEAT_TIMEOUT_SECS, spawn_heartbeat,
};
pub use supervisor::{CONNECT_TIMEOUT_SECS, RconHandle, RconSupervisor};
