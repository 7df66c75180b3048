//! Error types shared across the crate

use thiserror::Error;

/// Errors raised by the timer engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    /// An interval of zero or less was passed to `new` or `set_interval`
    #[error("Interval must be positive, got {0} ms")]
    NonPositiveInterval(i64),
}

/// Errors raised while writing persisted state
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
