use crate::ShutdownAction;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Live countdown for one server. `started_at` is the single source of
/// truth for progress; `remaining` is always recomputed from it so a
/// late tick self-corrects instead of drifting.
pub(crate) struct ShutdownTask {
    pub(crate) action: ShutdownAction,
    pub(crate) total_seconds: u64,
    pub(crate) started_at: Instant,
    pub(crate) tick: Option<JoinHandle<()>>,
}

impl ShutdownTask {
    pub(crate) fn new(action: ShutdownAction, total_seconds: u64) -> Self {
        Self {
            action,
            total_seconds,
            started_at: Instant::now(),
            tick: None,
        }
    }

    pub(crate) fn elapsed_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub(crate) fn remaining(&self) -> u64 {
        self.total_seconds.saturating_sub(self.elapsed_seconds())
    }

    pub(crate) fn status(&self) -> CountdownStatus {
        CountdownStatus {
            action: self.action,
            total_seconds: self.total_seconds,
            remaining: self.remaining(),
            elapsed_seconds: self.elapsed_seconds(),
        }
    }
}

impl Drop for ShutdownTask {
    fn drop(&mut self) {
        // Removal from the task map is cancellation; a pending tick
        // must never fire afterwards.
        if let Some(tick) = self.tick.take() {
            tick.abort();
        }
    }
}

/// Wall-clock view of a running countdown.
#[derive(Debug, Clone, Serialize)]
pub struct CountdownStatus {
    pub action: ShutdownAction,
    pub total_seconds: u64,
    pub remaining: u64,
    pub elapsed_seconds: u64,
}
