//! Error types for the core pipeline.

use thiserror::Error;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Mail provider call failed.
    #[error("Mail source error: {0}")]
    Mail(#[from] mailsense_gmail::MailError),

    /// Completion provider call failed or returned malformed output.
    #[error("Completion error: {0}")]
    Llm(#[from] mailsense_llm::LlmError),

    /// The query was blank after trimming.
    #[error("No query provided")]
    EmptyQuery,
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
