use crate::Outgoing;
use crate::supervisor::WsSupervisor;

use std::sync::Arc;
use std::time::Duration;

use log::warn;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at, timeout};

pub const HEARTBEAT_INTERVAL_SECS: u64 = 45;
pub const PONG_TIMEOUT_SECS: u64 = 15;
/// Pong slower than this is logged as degraded, not torn down.
pub const DEGRADED_LATENCY_SECS: u64 = 10;

/// Ping every live session on a fixed cadence and tear down the ones
/// whose pong never arrives. Probes run as their own tasks so one slow
/// peer cannot delay the others past the shared deadline.
pub fn spawn_heartbeat(supervisor: Arc<WsSupervisor>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let interval = Duration::from_secs(HEARTBEAT_INTERVAL_SECS);
        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            for (server, handle) in supervisor.store.handles().await {
                if handle.is_closed() {
                    warn!("[ws] {} writer is gone, tearing down", server);
                    supervisor.teardown(&server, &handle, true).await;
                    continue;
                }

                let Some(signal) = supervisor.pong_signal(&server).await else {
                    continue;
                };
                drain_stale_pong(&signal).await;

                if handle.send(Outgoing::Ping).await.is_err() {
                    warn!("[ws] {} ping failed, tearing down", server);
                    supervisor.teardown(&server, &handle, true).await;
                    continue;
                }

                let supervisor = Arc::clone(&supervisor);
                tokio::spawn(async move {
                    let started = Instant::now();
                    match timeout(Duration::from_secs(PONG_TIMEOUT_SECS), signal.notified()).await {
                        Ok(()) => {
                            let latency = started.elapsed();
                            if latency.as_secs() >= DEGRADED_LATENCY_SECS {
                                warn!(
                                    "[ws] {} heartbeat degraded ({}ms)",
                                    server,
                                    latency.as_millis()
                                );
                            }
                        }
                        Err(_) => {
                            warn!(
                                "[ws] {} pong missing after {}s, tearing down",
                                server, PONG_TIMEOUT_SECS
                            );
                            supervisor.teardown(&server, &handle, true).await;
                        }
                    }
                });
            }
        }
    })
}

/// A pong that lands after its probe already timed out leaves a stored
/// permit on the signal. Consume it before pinging, so the next probe
/// can only complete against a pong from its own cycle.
pub(crate) async fn drain_stale_pong(signal: &Notify) {
    let stale = signal.notified();
    tokio::pin!(stale);
    let _ = futures::poll!(stale.as_mut());
}
