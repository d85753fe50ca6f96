use std::panic::Location;
use std::path::PathBuf;

use error_location::ErrorLocation;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum ConfigError {
    #[error("{category} error: {message} {location}")]
    Generic {
        category: &'static str,
        message: String,
        location: ErrorLocation,
    },

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    /// Create a config error
    #[track_caller]
    pub fn config<S: Into<String>>(message: S) -> Self {
        ConfigError::Generic {
            category: "Config",
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Create a listener error
    #[track_caller]
    pub fn listener<S: Into<String>>(message: S) -> Self {
        ConfigError::Generic {
            category: "Listener",
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Create a server-profile error
    #[track_caller]
    pub fn profile<S: Into<String>>(message: S) -> Self {
        ConfigError::Generic {
            category: "Profile",
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type ConfigErrorResult<T> = std::result::Result<T, ConfigError>;
