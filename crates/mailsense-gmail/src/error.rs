//! Error types for the mail source.

use thiserror::Error;

/// Errors that can occur while talking to the mail provider.
#[derive(Debug, Error)]
pub enum MailError {
    /// HTTP transport failure (network, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status code.
    #[error("Gmail API returned status {0}")]
    Status(reqwest::StatusCode),

    /// A message payload was missing fields or could not be decoded.
    #[error("Malformed message payload: {0}")]
    Decode(String),
}

/// Result type alias using our `MailError` type.
pub type Result<T> = std::result::Result<T, MailError>;
