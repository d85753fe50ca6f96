use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_LISTENER_HOST, DEFAULT_LISTENER_PATH,
    DEFAULT_LISTENER_PORT,
};

use serde::Deserialize;

/// Inbound WebSocket endpoint that game servers dial into.
/// `password` is the shared secret checked against the peer's bearer
/// token; `None` disables the token check entirely.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub password: Option<String>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: String::from(DEFAULT_LISTENER_HOST),
            port: DEFAULT_LISTENER_PORT,
            path: String::from(DEFAULT_LISTENER_PATH),
            password: None,
        }
    }
}

impl ListenerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> ConfigErrorResult<()> {
        if !self.enabled {
            return Ok(());
        }

        if self.port == 0 {
            return Err(ConfigError::listener("listener.port must not be 0"));
        }

        if !self.path.starts_with('/') {
            return Err(ConfigError::listener(format!(
                "listener.path must start with '/', got {}",
                self.path
            )));
        }

        Ok(())
    }
}
