use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the persistence and configuration layers
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid duration '{input}': {reason}")]
    InvalidDuration { input: String, reason: &'static str },

    /// Raised by `MemoryStore` when it is told to fail
    #[error("Storage unavailable")]
    Unavailable,
}
