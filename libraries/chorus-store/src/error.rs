//! Error types for the record store client.

use thiserror::Error;

/// Errors that can occur when talking to the remote record store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Store returned a non-success response
    #[error("Store error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Store is offline or unreachable
    #[error("Store unreachable: {0}")]
    Unreachable(String),

    /// Failed to parse a store response
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Invalid store URL
    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),

    /// Login rejected: no account matches the credentials
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Registration rejected: an account with this email already exists
    #[error("An account with this email already exists")]
    EmailTaken,

    /// A record the caller asked for does not exist
    #[error("Record not found: {0}")]
    RecordNotFound(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
