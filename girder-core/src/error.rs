use thiserror::Error;

/// Unified error type for girder.
#[derive(Error, Debug)]
pub enum GirderError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Unknown logger mode: {0}")]
    UnknownLoggerMode(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Queue error: {0}")]
    Queue(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Internal: {0}")]
    Internal(String),
}
