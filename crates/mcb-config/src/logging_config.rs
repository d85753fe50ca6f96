use crate::{DEFAULT_LOG_DIRECTORY, LogLevel};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub dir: String,
    /// Optional log file name. None = stdout only.
    pub file: Option<String>,
    /// Colored output for TTY (ignored when logging to a file).
    pub colored: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            dir: String::from(DEFAULT_LOG_DIRECTORY),
            file: None,
            colored: true,
        }
    }
}
