use crate::RconSupervisor;

use std::sync::Arc;
use std::time::Duration;

use log::warn;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at, timeout};

// Liveness probing for sessions that die without an I/O error: a cheap
// `list` query every 30s, raced against a 10s timeout. Responses slower
// than 8s are reported but not acted on.
pub const HEARTBEAT_INTERVAL_SECS: u64 = 30;
pub const HEARTBEAT_TIMEOUT_SECS: u64 = 10;
pub const DEGRADED_LATENCY_SECS: u64 = 8;
const HEARTBEAT_COMMAND: &str = "list";

/// Spawn the periodic RCON liveness monitor. A failed probe is treated
/// as connection death: teardown plus the shared reconnect policy.
pub fn spawn_heartbeat(supervisor: Arc<RconSupervisor>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = Duration::from_secs(HEARTBEAT_INTERVAL_SECS);
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            for (server, handle) in supervisor.store.handles().await {
                let started = Instant::now();
                let probe = async {
                    let mut connection = handle.lock().await;
                    connection.cmd(HEARTBEAT_COMMAND).await
                };

                match timeout(Duration::from_secs(HEARTBEAT_TIMEOUT_SECS), probe).await {
                    Ok(Ok(_)) => {
                        let elapsed = started.elapsed();
                        if elapsed > Duration::from_secs(DEGRADED_LATENCY_SECS) {
                            warn!(
                                "[rcon] {} heartbeat is slow ({}ms)",
                                server,
                                elapsed.as_millis()
                            );
                        }
                    }
                    Ok(Err(e)) => {
                        warn!("[rcon] {} heartbeat failed: {}", server, e);
                        supervisor.handle_drop(&server).await;
                    }
                    Err(_) => {
                        warn!(
                            "[rcon] {} heartbeat timed out after {}s",
                            server, HEARTBEAT_TIMEOUT_SECS
                        );
                        supervisor.handle_drop(&server).await;
                    }
                }
            }
        }
    })
}
