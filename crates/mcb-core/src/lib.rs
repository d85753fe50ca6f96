mod connection_state;
mod connection_status;
mod connection_store;
mod error;
mod inbound;
mod reconnect;

pub use connection_state::ConnectionState;
pub use connection_status::ConnectionStatus;
pub use connection_store::ConnectionStore;
pub use error::{BridgeError, Result};
pub use inbound::{EventSender, InboundEvent};
pub use reconnect::{ReconnectPolicy, ReconnectRegime};

pub use reconnect::{
    BACKOFF_EXPONENT_CEILING, DEFAULT_BASE_DELAY_SECS, DEFAULT_LONG_TERM_DELAY_SECS,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY_SECS,
};

#[cfg(test)]
mod tests;
