//! Action-item synthesis from the top cached messages.
//!
//! Derives a short to-do list via one completion call and caches it behind
//! its own staleness timer. Unlike the query resolver, a completion failure
//! here propagates to the caller instead of being folded into answer text.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use mailsense_llm::CompletionProvider;

use crate::cache::MailCache;
use crate::classify::Classifier;
use crate::error::Result;
use crate::model::snippet;

/// How long a derived to-do list stays fresh.
pub const TODO_STALENESS_WINDOW: Duration = Duration::from_secs(300);

/// How many of the newest messages feed the synthesis prompt.
const SOURCE_MESSAGES: usize = 10;
const SNIPPET_CHARS: usize = 150;
const TODO_MAX_TOKENS: u32 = 300;
const TODO_TEMPERATURE: f32 = 0.5;

const TODO_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that extracts action items from emails.";

/// Derives and caches a short to-do list from recent mail.
pub struct TodoSynthesizer {
    cache: Arc<MailCache>,
    classifier: Arc<Classifier>,
    provider: Arc<dyn CompletionProvider>,
    state: RwLock<TodoState>,
}

#[derive(Default)]
struct TodoState {
    items: Vec<String>,
    derived_at: Option<Instant>,
}

impl TodoSynthesizer {
    /// Wire a synthesizer over the shared cache, classifier, and provider.
    #[must_use]
    pub fn new(
        cache: Arc<MailCache>,
        classifier: Arc<Classifier>,
        provider: Arc<dyn CompletionProvider>,
    ) -> Self {
        Self {
            cache,
            classifier,
            provider,
            state: RwLock::new(TodoState::default()),
        }
    }

    /// Return the cached to-do list, recomputing when stale, empty, or
    /// forced.
    ///
    /// # Errors
    ///
    /// Returns an error if the completion call fails during recomputation.
    pub async fn get_todos(&self, force_refresh: bool) -> Result<Vec<String>> {
        if force_refresh {
            self.state.write().await.derived_at = None;
        }

        {
            let state = self.state.read().await;
            if let Some(derived_at) = state.derived_at
                && derived_at.elapsed() < TODO_STALENESS_WINDOW
                && !state.items.is_empty()
            {
                return Ok(state.items.clone());
            }
        }

        self.cache.refresh(false).await;
        let joined = self
            .classifier
            .join(self.cache.get_recent(SOURCE_MESSAGES).await)
            .await;

        let mut prompt = String::from(
            "From the following emails, produce up to 5 short action items the \
             user should handle, one per line:\n\n",
        );
        for (i, (message, classification)) in joined.iter().enumerate() {
            let tag_info = classification
                .map_or_else(String::new, |c| format!(" [{}]", c.tag.as_str()));
            let _ = write!(
                prompt,
                "Email {}:{}\nFrom: {}\nSubject: {}\nSnippet: {}...\n\n",
                i + 1,
                tag_info,
                message.sender,
                message.subject,
                snippet(&message.body, SNIPPET_CHARS),
            );
        }

        let response = self
            .provider
            .complete(TODO_SYSTEM_PROMPT, &prompt, TODO_MAX_TOKENS, TODO_TEMPERATURE)
            .await?;

        let items: Vec<String> = response
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToString::to_string)
            .collect();
        debug!(count = items.len(), "to-do list derived");

        let mut state = self.state.write().await;
        state.items.clone_from(&items);
        state.derived_at = Some(Instant::now());

        Ok(items)
    }
}
