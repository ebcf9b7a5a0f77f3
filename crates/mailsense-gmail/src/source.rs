//! Mail source contract and message model.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;

/// A single fetched email message.
///
/// Immutable once fetched; classification data lives alongside it in the
/// consuming pipeline, never inside the message itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Provider-assigned identifier, unique and stable.
    pub id: String,
    /// Sender address or display name.
    pub sender: String,
    /// Message subject.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    /// When the provider received the message.
    pub timestamp: DateTime<Utc>,
}

/// A provider of recent mail.
///
/// Implementations must return messages ordered newest-first, with ids
/// unique within a single call.
#[async_trait]
pub trait MailSource: Send + Sync {
    /// Fetch up to `max` most recent messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be reached or a message
    /// cannot be decoded.
    async fn fetch_recent(&self, max: usize) -> Result<Vec<Message>>;
}
