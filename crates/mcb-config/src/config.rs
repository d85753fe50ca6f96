use crate::{ConfigError, ConfigErrorResult, ListenerConfig, LoggingConfig, ServerProfile};

use std::collections::HashSet;
use std::path::PathBuf;

use log::{info, warn};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Global debug flag: log every inbound WebSocket payload.
    pub debug: bool,
    pub listener: ListenerConfig,
    pub logging: LoggingConfig,
    #[serde(rename = "servers")]
    pub servers: Vec<ServerProfile>,
}

impl Config {
    /// Load config with full production error handling.
    ///
    /// Loading order:
    /// 1. Check for MCB_CONFIG_DIR env var, else use ./.mcb/
    /// 2. Auto-create config directory if it doesn't exist
    /// 3. Load config.toml if it exists, else use defaults
    /// 4. Apply MCB_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;

        if !config_dir.exists() {
            std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::Io {
                path: config_dir.clone(),
                source: e,
            })?;
        }

        let config_path = config_dir.join("config.toml");

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Load and parse TOML file with detailed error context.
    fn load_toml(path: &PathBuf) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.clone(),
            source: e,
        })
    }

    /// Get the config directory.
    /// Priority: MCB_CONFIG_DIR env var > ./.mcb/ (relative to cwd)
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var("MCB_CONFIG_DIR") {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(".mcb"))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("MCB_DEBUG") {
            self.debug = value.eq_ignore_ascii_case("true") || value == "1";
        }

        if let Ok(value) = std::env::var("MCB_LISTENER_PORT") {
            match value.parse::<u16>() {
                Ok(port) => self.listener.port = port,
                Err(_) => warn!("Ignoring invalid MCB_LISTENER_PORT: {}", value),
            }
        }

        if let Ok(value) = std::env::var("MCB_LISTENER_PASSWORD") {
            self.listener.password = if value.is_empty() { None } else { Some(value) };
        }

        if let Ok(value) = std::env::var("MCB_LOG_LEVEL") {
            // Parsing cannot fail; unknown names degrade to Info.
            self.logging.level = value.parse().unwrap_or_default();
        }
    }

    /// Validate all configuration.
    /// Call after load() to catch all errors at startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.listener.validate()?;

        let mut names = HashSet::new();
        for profile in &self.servers {
            profile.validate()?;
            if !names.insert(profile.server_name.as_str()) {
                return Err(ConfigError::config(format!(
                    "Duplicate server_name: {}",
                    profile.server_name
                )));
            }
        }

        Ok(())
    }

    /// Log the effective configuration at startup (secrets elided).
    pub fn log_summary(&self) {
        info!(
            "Config: {} server profile(s), debug={}",
            self.servers.len(),
            self.debug
        );

        if self.listener.enabled {
            info!(
                "Listener: ws://{}{} (token check: {})",
                self.listener.bind_addr(),
                self.listener.path,
                if self.listener.password.is_some() {
                    "on"
                } else {
                    "off"
                }
            );
        } else {
            info!("Listener: disabled");
        }

        for profile in &self.servers {
            info!(
                "  {}: rcon={} ws={}",
                profile.server_name,
                if profile.rcon_complete() {
                    profile.rcon_addr()
                } else {
                    String::from("off")
                },
                if profile.ws_complete() {
                    profile.ws_url.clone()
                } else {
                    String::from("off")
                }
            );
        }
    }
}
