use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Not connected to {server} {location}")]
    NotConnected {
        server: String,
        location: ErrorLocation,
    },

    #[error("Authentication rejected: {reason} {location}")]
    AuthRejected {
        reason: String,
        location: ErrorLocation,
    },

    #[error("Duplicate identity: a connection named {server} already exists {location}")]
    DuplicateIdentity {
        server: String,
        location: ErrorLocation,
    },

    #[error("A countdown is already running for {server} {location}")]
    AlreadyRunning {
        server: String,
        location: ErrorLocation,
    },

    #[error("Transport error on {server}: {message} {location}")]
    TransportError {
        server: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("{operation} timed out after {timeout_secs}s {location}")]
    Timeout {
        operation: String,
        timeout_secs: u64,
        location: ErrorLocation,
    },
}

impl BridgeError {
    #[track_caller]
    pub fn not_connected<S: Into<String>>(server: S) -> Self {
        Self::NotConnected {
            server: server.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn auth_rejected<S: Into<String>>(reason: S) -> Self {
        Self::AuthRejected {
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn duplicate_identity<S: Into<String>>(server: S) -> Self {
        Self::DuplicateIdentity {
            server: server.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn already_running<S: Into<String>>(server: S) -> Self {
        Self::AlreadyRunning {
            server: server.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn transport<S: Into<String>, M: Into<String>>(server: S, message: M) -> Self {
        Self::TransportError {
            server: server.into(),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn timeout<S: Into<String>>(operation: S, timeout_secs: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_secs,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
