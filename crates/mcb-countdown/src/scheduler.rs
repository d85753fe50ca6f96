use crate::task::{CountdownStatus, ShutdownTask};
use crate::{ServerLink, ShutdownAction};

use mcb_core::{BridgeError, Result};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

pub const MIN_COUNTDOWN_SECS: u64 = 5;
pub const MAX_COUNTDOWN_SECS: u64 = 300;

/// Pause between the final notification and the terminal command, so
/// players actually see it before the server goes away.
const FINAL_RENDER_WAIT_SECS: u64 = 1;

/// Drives shutdown/restart countdowns, one task per server name.
/// Ticks re-align to whole-second boundaries of the task's own start
/// instant, and the remaining time is always recomputed from the wall
/// clock, so a delayed tick skips ahead instead of stretching the
/// countdown.
pub struct CountdownScheduler {
    link: Arc<dyn ServerLink>,
    tasks: Arc<RwLock<HashMap<String, ShutdownTask>>>,
}

impl CountdownScheduler {
    pub fn new(link: Arc<dyn ServerLink>) -> Arc<Self> {
        Arc::new(Self {
            link,
            tasks: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Begin a countdown. `total_seconds` is validated by the caller to
    /// lie in `[MIN_COUNTDOWN_SECS, MAX_COUNTDOWN_SECS]`. Rejects with
    /// `AlreadyRunning` while a task for the same server exists.
    pub async fn start(
        self: &Arc<Self>,
        server: &str,
        total_seconds: u64,
        action: ShutdownAction,
    ) -> Result<()> {
        {
            let mut tasks = self.tasks.write().await;
            if tasks.contains_key(server) {
                return Err(BridgeError::already_running(server));
            }
            tasks.insert(server.to_string(), ShutdownTask::new(action, total_seconds));
        }

        info!(
            "[countdown] {} {} in {}s",
            server,
            action.label(),
            total_seconds
        );

        // Opening notification: the cadence wording for this remaining
        // value, or the generic announcement when the cadence is quiet.
        let (title, subtitle) = notification(action, total_seconds).unwrap_or_else(|| {
            (
                format!("Server {} imminent", action.label()),
                format!("{} seconds remaining", total_seconds),
            )
        });
        self.notify(server, title, subtitle);

        let ticker = self.spawn_ticker(server);
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(server) {
            Some(task) => task.tick = Some(ticker),
            // Cancelled between insertion and arming.
            None => ticker.abort(),
        }
        Ok(())
    }

    /// Abort the countdown. `false` when there was nothing to cancel.
    pub async fn cancel(self: &Arc<Self>, server: &str) -> bool {
        let removed = {
            let mut tasks = self.tasks.write().await;
            tasks.remove(server)
        };

        let Some(task) = removed else {
            info!("[countdown] {} has nothing to cancel", server);
            return false;
        };

        info!("[countdown] {} {} cancelled", server, task.action.label());
        self.notify(
            server,
            format!("Server {} cancelled", task.action.label()),
            String::from("An operator cancelled the countdown"),
        );
        true
    }

    /// Read-only view of every running countdown, recomputed from the
    /// wall clock.
    pub async fn status_snapshot(&self) -> HashMap<String, CountdownStatus> {
        let tasks = self.tasks.read().await;
        tasks
            .iter()
            .map(|(name, task)| (name.clone(), task.status()))
            .collect()
    }

    pub async fn is_running(&self, server: &str) -> bool {
        self.tasks.read().await.contains_key(server)
    }

    /// One persistent timer loop per task: sleep to the top of the next
    /// whole second of the task's clock, apply the tick, repeat. The
    /// loop exits when the task disappears or the countdown expires.
    fn spawn_ticker(self: &Arc<Self>, server: &str) -> JoinHandle<()> {
        let scheduler = Arc::clone(self);
        let name = server.to_string();
        tokio::spawn(async move {
            loop {
                let Some(delay) = scheduler.next_tick_delay(&name).await else {
                    break;
                };
                tokio::time::sleep(delay).await;
                if !scheduler.tick(&name).await {
                    break;
                }
            }
        })
    }

    async fn next_tick_delay(&self, server: &str) -> Option<Duration> {
        let tasks = self.tasks.read().await;
        let task = tasks.get(server)?;
        let elapsed_ms = task.started_at.elapsed().as_millis() as u64;
        Some(Duration::from_millis(
            (elapsed_ms / 1000 + 1) * 1000 - elapsed_ms,
        ))
    }

    /// Apply one tick. `false` ends the ticker loop.
    async fn tick(self: &Arc<Self>, server: &str) -> bool {
        let progress = {
            let tasks = self.tasks.read().await;
            let Some(task) = tasks.get(server) else {
                return false;
            };
            (task.action, task.remaining())
        };

        let (action, remaining) = progress;
        if remaining == 0 {
            self.execute(server, action).await;
            return false;
        }

        if let Some((title, subtitle)) = notification(action, remaining) {
            self.notify(server, title, subtitle);
        }
        true
    }

    /// Expiry: final notification, a short render pause, then the
    /// terminal command. A missing RCON session is logged, not
    /// escalated; the task tears down regardless.
    async fn execute(self: &Arc<Self>, server: &str, action: ShutdownAction) {
        let title = format!("Server {} in progress...", action.label());
        if let Err(e) = self
            .link
            .send_title(server, &title, "Reconnect in a moment")
            .await
        {
            warn!("[countdown] {} final notification failed: {}", server, e);
        }

        tokio::time::sleep(Duration::from_secs(FINAL_RENDER_WAIT_SECS)).await;

        // The render pause is a cancellation window.
        if !self.is_running(server).await {
            return;
        }

        match self.link.run_command(server, action.command()).await {
            Ok(_) => info!("[countdown] {} {} command issued", server, action.command()),
            Err(e) => error!(
                "[countdown] {} cannot issue {}: {}",
                server,
                action.command(),
                e
            ),
        }

        if let Some(mut task) = self.tasks.write().await.remove(server) {
            // The ticker is the caller; never abort it out from under
            // itself.
            task.tick.take();
        }
    }

    /// Fire-and-forget notification; a failed title never stalls or
    /// aborts the countdown.
    fn notify(self: &Arc<Self>, server: &str, title: String, subtitle: String) {
        let scheduler = Arc::clone(self);
        let name = server.to_string();
        tokio::spawn(async move {
            if let Err(e) = scheduler.link.send_title(&name, &title, &subtitle).await {
                warn!("[countdown] {} notification failed: {}", name, e);
            }
        });
    }
}

/// Notification cadence by remaining seconds: large digits for the
/// final 5, a per-second reminder through 10, then every 10 seconds or
/// continuously inside the last 30. Quiet otherwise.
fn notification(action: ShutdownAction, remaining: u64) -> Option<(String, String)> {
    if remaining <= 5 {
        Some((
            format!("{remaining}"),
            format!("Server {} imminent", action.label()),
        ))
    } else if remaining <= 10 {
        Some((
            format!("{} countdown", action.label()),
            format!("{remaining} seconds remaining"),
        ))
    } else if remaining % 10 == 0 || remaining <= 30 {
        Some((
            format!("Server {} imminent", action.label()),
            format!("{remaining} seconds remaining"),
        ))
    } else {
        None
    }
}

#[cfg(test)]
pub(crate) fn cadence(action: ShutdownAction, remaining: u64) -> Option<(String, String)> {
    notification(action, remaining)
}
