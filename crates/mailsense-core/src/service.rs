//! Assistant facade wiring the pipeline together.
//!
//! Owns the cache, classifier, resolver, and to-do synthesizer, and exposes
//! the three operations a route layer consumes. Instantiated explicitly at
//! startup and shared behind an `Arc`; there is no module-level state.

use std::sync::Arc;

use mailsense_gmail::MailSource;
use mailsense_llm::CompletionProvider;

use crate::cache::MailCache;
use crate::classify::Classifier;
use crate::error::{Error, Result};
use crate::model::{MessageOverview, snippet};
use crate::resolve::QueryResolver;
use crate::todo::TodoSynthesizer;

const OVERVIEW_COUNT: usize = 10;
const OVERVIEW_SNIPPET_CHARS: usize = 100;

/// The email assistant: cache, classification, and query answering.
pub struct Assistant {
    cache: Arc<MailCache>,
    classifier: Arc<Classifier>,
    resolver: QueryResolver,
    todos: TodoSynthesizer,
}

impl Assistant {
    /// Wire an assistant over a mail source and a completion provider.
    #[must_use]
    pub fn new(source: Arc<dyn MailSource>, provider: Arc<dyn CompletionProvider>) -> Self {
        let classifier = Arc::new(Classifier::new(Arc::clone(&provider)));
        let cache = Arc::new(MailCache::new(source, Arc::clone(&classifier)));
        let resolver = QueryResolver::new(
            Arc::clone(&cache),
            Arc::clone(&classifier),
            Arc::clone(&provider),
        );
        let todos = TodoSynthesizer::new(Arc::clone(&cache), Arc::clone(&classifier), provider);

        Self {
            cache,
            classifier,
            resolver,
            todos,
        }
    }

    /// Refresh the mail cache (TTL-respecting unless forced).
    ///
    /// Used at startup to warm the cache before serving.
    pub async fn refresh(&self, force: bool) {
        self.cache.refresh(force).await;
    }

    /// Answer a free-text query about recent mail.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyQuery`] if the query is blank after trimming;
    /// every other failure degrades into the answer text.
    pub async fn resolve(&self, query: &str) -> Result<String> {
        if query.trim().is_empty() {
            return Err(Error::EmptyQuery);
        }
        self.resolver.answer(query).await
    }

    /// List the latest `n` (at most 10) messages for the popup, with tags
    /// where classification has caught up.
    pub async fn list_recent(&self, n: usize) -> Vec<MessageOverview> {
        self.cache.refresh(false).await;
        let recent = self.cache.get_recent(n.min(OVERVIEW_COUNT)).await;

        self.classifier
            .join(recent)
            .await
            .into_iter()
            .map(|(message, classification)| MessageOverview {
                id: message.id,
                sender: message.sender,
                subject: message.subject,
                snippet: snippet(&message.body, OVERVIEW_SNIPPET_CHARS),
                tag: classification.map(|c| c.tag),
                tag_emoji: classification.map(|c| c.tag.emoji().to_string()),
                is_spam: classification.map(|c| c.is_spam),
            })
            .collect()
    }

    /// Return the cached or freshly derived to-do list.
    ///
    /// # Errors
    ///
    /// Returns an error if the completion call fails during recomputation.
    pub async fn list_todos(&self, force_refresh: bool) -> Result<Vec<String>> {
        self.todos.get_todos(force_refresh).await
    }
}
