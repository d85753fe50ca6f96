mod config;
mod error;
mod listener_config;
mod log_level;
mod logging_config;
mod server_profile;

pub use config::Config;
pub use error::{ConfigError, ConfigErrorResult};
pub use listener_config::ListenerConfig;
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use server_profile::ServerProfile;

const DEFAULT_LISTENER_HOST: &str = "127.0.0.1";
const DEFAULT_LISTENER_PORT: u16 = 8765;
const DEFAULT_LISTENER_PATH: &str = "/minecraft/ws";
const DEFAULT_LOG_DIRECTORY: &str = "log";

/// Default bounded-attempt ceiling before a profile switches to the
/// long-term reconnect regime.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[cfg(test)]
mod tests;
