use crate::{ConfigError, ConfigErrorResult, DEFAULT_MAX_ATTEMPTS};

use serde::Deserialize;

/// One configured game server, keyed by `server_name` across both
/// transports. Owned by the config layer; the connection core reads it
/// and never writes it back.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerProfile {
    pub server_name: String,

    // RCON transport
    #[serde(default)]
    pub rcon_enabled: bool,
    #[serde(default)]
    pub rcon_host: String,
    #[serde(default)]
    pub rcon_port: u16,
    #[serde(default)]
    pub rcon_password: String,
    #[serde(default = "default_max_attempts")]
    pub rcon_max_attempts: u32,

    // WebSocket transport (outbound dial)
    #[serde(default)]
    pub ws_enabled: bool,
    #[serde(default)]
    pub ws_url: String,
    #[serde(default)]
    pub ws_password: Option<String>,
    #[serde(default = "default_max_attempts")]
    pub ws_max_attempts: u32,
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

impl ServerProfile {
    /// RCON is enabled and every field needed to dial is present.
    /// Enabled-but-incomplete profiles are skipped with a warning at
    /// startup rather than failing validation.
    pub fn rcon_complete(&self) -> bool {
        self.rcon_enabled
            && !self.rcon_host.is_empty()
            && self.rcon_port != 0
            && !self.rcon_password.is_empty()
    }

    /// WebSocket dialing is enabled and a URL is present.
    pub fn ws_complete(&self) -> bool {
        self.ws_enabled && !self.ws_url.is_empty()
    }

    pub fn rcon_addr(&self) -> String {
        format!("{}:{}", self.rcon_host, self.rcon_port)
    }

    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.server_name.trim().is_empty() {
            return Err(ConfigError::profile("server_name must not be empty"));
        }

        if self.rcon_max_attempts == 0 {
            return Err(ConfigError::profile(format!(
                "{}: rcon_max_attempts must be at least 1",
                self.server_name
            )));
        }

        if self.ws_max_attempts == 0 {
            return Err(ConfigError::profile(format!(
                "{}: ws_max_attempts must be at least 1",
                self.server_name
            )));
        }

        if self.ws_complete()
            && !self.ws_url.starts_with("ws://")
            && !self.ws_url.starts_with("wss://")
        {
            return Err(ConfigError::profile(format!(
                "{}: ws_url must start with ws:// or wss://, got {}",
                self.server_name, self.ws_url
            )));
        }

        Ok(())
    }
}
