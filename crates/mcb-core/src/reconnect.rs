use std::time::Duration;

// Shared reconnect schedule for both transports:
// - 5s base delay doubling per attempt, capped at 300s
// - exponent stops growing after 2^6 so the arithmetic can never overflow
// - past max_attempts the supervisor retries every 300s forever
pub const DEFAULT_BASE_DELAY_SECS: u64 = 5;
pub const DEFAULT_MAX_DELAY_SECS: u64 = 300;
pub const DEFAULT_LONG_TERM_DELAY_SECS: u64 = 300;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const BACKOFF_EXPONENT_CEILING: u32 = 6;

/// Which retry phase a connection is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectRegime {
    /// Bounded attempts with growing backoff.
    ShortTerm,
    /// Unbounded retries at a fixed long interval — never gives up.
    LongTerm,
}

/// Backoff schedule shared by the RCON and WebSocket supervisors.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub long_term_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(DEFAULT_BASE_DELAY_SECS),
            max_delay: Duration::from_secs(DEFAULT_MAX_DELAY_SECS),
            long_term_delay: Duration::from_secs(DEFAULT_LONG_TERM_DELAY_SECS),
        }
    }
}

impl ReconnectPolicy {
    pub fn regime(&self, attempts: u32, max_attempts: u32) -> ReconnectRegime {
        if attempts > max_attempts {
            ReconnectRegime::LongTerm
        } else {
            ReconnectRegime::ShortTerm
        }
    }

    /// Exponential backoff for the short-term regime. Attempt 1 waits
    /// the base delay; each further attempt doubles it up to the cap.
    pub fn backoff_delay(&self, attempts: u32) -> Duration {
        let exponent = attempts.saturating_sub(1).min(BACKOFF_EXPONENT_CEILING);
        let delay = self.base_delay.saturating_mul(1u32 << exponent);
        delay.min(self.max_delay)
    }

    /// Delay before the next reconnect attempt, regime included.
    pub fn delay(&self, attempts: u32, max_attempts: u32) -> Duration {
        match self.regime(attempts, max_attempts) {
            ReconnectRegime::ShortTerm => self.backoff_delay(attempts),
            ReconnectRegime::LongTerm => self.long_term_delay,
        }
    }
}
