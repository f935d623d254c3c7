// src/error.rs

use thiserror::Error;

/// Core error types for modsweep
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot or session files that could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A snapshot required for the operation does not exist yet
    #[error("Snapshot not found at path: {0}")]
    SnapshotNotFound(String),

    /// No session file (run `modsweep setup` first)
    #[error("Session not found at path: {0}")]
    SessionNotFound(String),

    /// An identifier that cannot be canonicalized
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// The subscription API returned an error or unusable data
    #[error("Remote error: {0}")]
    RemoteError(String),

    /// Malformed input data
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to set up a client or working directory
    #[error("Initialization error: {0}")]
    InitError(String),
}

/// Result type alias using modsweep's Error type
pub type Result<T> = std::result::Result<T, Error>;
