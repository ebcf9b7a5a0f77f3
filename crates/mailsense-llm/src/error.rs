//! Error types for the completion provider.

use thiserror::Error;

/// Errors that can occur while talking to the completion endpoint.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP transport failure (network, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status code.
    #[error("Completion API returned status {0}")]
    Status(reqwest::StatusCode),

    /// The completion came back but its content was not what was asked for.
    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),
}

/// Result type alias using our `LlmError` type.
pub type Result<T> = std::result::Result<T, LlmError>;
