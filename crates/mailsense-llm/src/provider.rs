//! Completion provider contract.

use async_trait::async_trait;

use crate::Result;

/// A black-box language-model completion service.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Request a free-text completion for `user_prompt` under
    /// `system_prompt`, bounded by `max_tokens`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint cannot be reached or the response
    /// carries no completion text.
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String>;

    /// Request a completion constrained to a single JSON object.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint cannot be reached or the completion
    /// text is not valid JSON.
    async fn complete_structured(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<serde_json::Value>;
}
