// Error types for event dispatch

use thiserror::Error;

/// Result type alias for dispatch operations
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Errors that can occur while handing events to a sink
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The background queue is at capacity; the event was not enqueued
    #[error("Dispatch queue is full (capacity {0})")]
    QueueFull(usize),

    /// The dispatcher has been shut down
    #[error("Dispatcher is closed")]
    Closed,

    #[error("Dispatch is not enabled")]
    NotEnabled,
}

impl DispatchError {
    pub fn config(msg: impl Into<String>) -> Self {
        DispatchError::Config(msg.into())
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        DispatchError::Connection(msg.into())
    }

    pub fn export(msg: impl Into<String>) -> Self {
        DispatchError::Export(msg.into())
    }
}
