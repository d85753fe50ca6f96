mod action;
mod link;
mod scheduler;
mod task;

pub use action::ShutdownAction;
pub use link::{BridgeLink, ServerLink};
pub use scheduler::{CountdownScheduler, MAX_COUNTDOWN_SECS, MIN_COUNTDOWN_SECS};
pub use task::CountdownStatus;

#[cfg(test)]
mod tests;
