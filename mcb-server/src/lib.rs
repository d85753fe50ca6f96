pub mod admin;
pub mod error;
pub mod logger;
pub mod routes;
pub mod status;

#[cfg(test)]
mod tests;

pub use routes::{AppState, build_router};
