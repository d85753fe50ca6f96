mod config;
mod log_level;
