//! Error types for the harness and configuration layers.
//!
//! The bus itself never fails: unsubscribing an unknown token is a no-op.

use thiserror::Error;

/// Main error type for harness and config operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("There are no observers to release")]
    NoSubscribers,

    #[error("Unknown subscriber: number {number} on {event_name}")]
    UnknownSubscriber { event_name: String, number: u64 },

    #[error("Unknown observer variant: {0}")]
    UnknownVariant(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Result type for harness and config operations.
pub type Result<T> = std::result::Result<T, Error>;
