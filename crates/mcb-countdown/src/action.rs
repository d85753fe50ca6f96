use std::fmt;

use serde::{Deserialize, Serialize};

/// What happens to the game server when a countdown expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShutdownAction {
    Stop,
    Restart,
}

impl ShutdownAction {
    /// The console command issued at expiry.
    pub fn command(&self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::Restart => "restart",
        }
    }

    /// Human wording used in countdown notifications.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Stop => "shutdown",
            Self::Restart => "restart",
        }
    }
}

impl fmt::Display for ShutdownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command())
    }
}
