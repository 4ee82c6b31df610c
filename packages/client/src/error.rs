//! Error types for the Goishi client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Could not reach the server, or the connection dropped
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The session is no longer connected
    #[error("Not connected to the server")]
    NotConnected,

    /// `connected` did not arrive in time
    #[error("Timed out waiting for the server greeting")]
    Timeout,

    #[error("Failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
}
