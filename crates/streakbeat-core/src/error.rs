//! Error type shared across all streakbeat crates.

use thiserror::Error;

/// Unified error for database, mail, config, and scheduler failures.
#[derive(Debug, Error)]
pub enum StreakbeatError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Mail error: {0}")]
    Mail(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StreakbeatError>;
