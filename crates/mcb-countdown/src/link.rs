use mcb_core::{BridgeError, Result};
use mcb_rcon::RconSupervisor;
use mcb_ws::WsSupervisor;

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde_json::json;

/// What the countdown scheduler needs from the rest of the bridge:
/// in-game notifications and console commands for one server.
#[async_trait]
pub trait ServerLink: Send + Sync {
    async fn send_title(&self, server: &str, title: &str, subtitle: &str) -> Result<()>;
    async fn run_command(&self, server: &str, command: &str) -> Result<String>;
}

/// Production link over both supervisors. Titles prefer the WebSocket
/// session when one is live (it carries a structured title API) and
/// fall back to RCON `title` commands; console commands are
/// RCON-only.
pub struct BridgeLink {
    ws: Arc<WsSupervisor>,
    rcon: Arc<RconSupervisor>,
}

impl BridgeLink {
    pub fn new(ws: Arc<WsSupervisor>, rcon: Arc<RconSupervisor>) -> Self {
        Self { ws, rcon }
    }
}

#[async_trait]
impl ServerLink for BridgeLink {
    async fn send_title(&self, server: &str, title: &str, subtitle: &str) -> Result<()> {
        if self.ws.is_connected(server).await {
            let echo = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default();
            let payload = json!({
                "api": "send_title",
                "data": { "title": title, "subtitle": subtitle },
                "echo": echo.to_string(),
            });
            return self.ws.send(server, payload.to_string()).await;
        }

        if self.rcon.is_connected(server).await {
            let command = format!("title @a title {}", json!({ "text": title }));
            self.rcon.send(server, &command).await?;
            if !subtitle.is_empty() {
                let command = format!("title @a subtitle {}", json!({ "text": subtitle }));
                self.rcon.send(server, &command).await?;
            }
            return Ok(());
        }

        Err(BridgeError::not_connected(server))
    }

    async fn run_command(&self, server: &str, command: &str) -> Result<String> {
        self.rcon.send(server, command).await
    }
}
