//! Background batch classification of cached messages.
//!
//! One prompt enumerates the whole batch against a fixed taxonomy and asks
//! for a single structured completion. Results merge back by message index;
//! anything the model misses, and the whole batch on any failure, falls
//! back to the default tag. Classification never blocks a request and is
//! allowed to go stale relative to a newer cache; join sites fall back to
//! the raw message on a lookup miss.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use mailsense_gmail::Message;
use mailsense_llm::{CompletionProvider, LlmError};

use crate::model::{Classification, ClassifiedMessage, Tag, looks_like_spam, snippet};

/// Upper bound on how many messages one classification call covers.
pub const MAX_BATCH: usize = 20;

const SNIPPET_CHARS: usize = 150;

const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that classifies emails by intent and sentiment.";

/// Batch classifier and its result store.
pub struct Classifier {
    provider: Arc<dyn CompletionProvider>,
    state: RwLock<ClassificationState>,
}

#[derive(Default)]
struct ClassificationState {
    entries: Vec<ClassifiedMessage>,
    by_id: HashMap<String, usize>,
}

impl Classifier {
    /// Create a classifier with an empty result store.
    #[must_use]
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            state: RwLock::new(ClassificationState::default()),
        }
    }

    /// Classify the first `max_batch` messages and replace the result store.
    ///
    /// Never fails: provider errors and malformed output tag the whole
    /// batch with [`Tag::Default`] instead of leaving partial results.
    pub async fn classify(&self, messages: Vec<Message>, max_batch: usize) {
        let batch: Vec<Message> = messages.into_iter().take(max_batch).collect();
        if batch.is_empty() {
            return;
        }

        let tags = match self.request_tags(&batch).await {
            Ok(tags) => tags,
            Err(err) => {
                warn!(%err, "classification failed, tagging batch with the default tag");
                vec![Tag::default(); batch.len()]
            }
        };

        let entries: Vec<ClassifiedMessage> = batch
            .into_iter()
            .zip(tags)
            .map(|(message, tag)| {
                let is_spam = tag == Tag::Spam || looks_like_spam(&message.subject, &message.body);
                ClassifiedMessage {
                    message,
                    classification: Classification { tag, is_spam },
                }
            })
            .collect();

        debug!(count = entries.len(), "classification store replaced");

        let by_id = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (entry.message.id.clone(), index))
            .collect();

        let mut state = self.state.write().await;
        *state = ClassificationState { entries, by_id };
    }

    async fn request_tags(&self, batch: &[Message]) -> mailsense_llm::Result<Vec<Tag>> {
        let prompt = build_prompt(batch);
        let value = self
            .provider
            .complete_structured(SYSTEM_PROMPT, &prompt)
            .await?;

        let payload: ClassificationPayload = serde_json::from_value(value)
            .map_err(|err| LlmError::MalformedResponse(format!("unexpected shape: {err}")))?;

        let mut tags = vec![Tag::default(); batch.len()];
        for entry in payload.classifications {
            // 1-based index; out-of-range entries are ignored.
            if let Some(slot) = entry
                .index
                .checked_sub(1)
                .and_then(|index| tags.get_mut(index))
            {
                *slot = Tag::parse(&entry.tag);
            }
        }

        Ok(tags)
    }

    /// Classification for a single message id, if one exists.
    pub async fn classified(&self, id: &str) -> Option<Classification> {
        let state = self.state.read().await;
        state
            .by_id
            .get(id)
            .map(|&index| state.entries[index].classification)
    }

    /// All entries currently flagged as spam, in store order.
    pub async fn spam_entries(&self) -> Vec<ClassifiedMessage> {
        let state = self.state.read().await;
        state
            .entries
            .iter()
            .filter(|entry| entry.classification.is_spam)
            .cloned()
            .collect()
    }

    /// Join messages with their classifications by id.
    ///
    /// A miss (unclassified message, or classification stale relative to a
    /// newer cache) yields `None` and the consumer uses the raw message.
    pub async fn join(&self, messages: Vec<Message>) -> Vec<(Message, Option<Classification>)> {
        let state = self.state.read().await;
        messages
            .into_iter()
            .map(|message| {
                let classification = state
                    .by_id
                    .get(&message.id)
                    .map(|&index| state.entries[index].classification);
                (message, classification)
            })
            .collect()
    }
}

#[derive(Deserialize)]
struct ClassificationPayload {
    #[serde(default)]
    classifications: Vec<ClassificationEntry>,
}

#[derive(Deserialize)]
struct ClassificationEntry {
    index: usize,
    tag: String,
}

/// Build the batch classification prompt.
fn build_prompt(batch: &[Message]) -> String {
    let mut prompt = String::from(
        "Classify each email into exactly one of these categories:\n\
         1. urgent - Time-sensitive or critical matter requiring immediate attention\n\
         2. business - Professional or work-related correspondence\n\
         3. friendly - Personal, social, or positive in nature\n\
         4. complaint - Expressing dissatisfaction or raising an issue\n\
         5. spam - Unsolicited bulk or promotional mail\n\n",
    );

    for (i, message) in batch.iter().enumerate() {
        let _ = write!(
            prompt,
            "Email {}:\nFrom: {}\nSubject: {}\nSnippet: {}...\n\n",
            i + 1,
            message.sender,
            message.subject,
            snippet(&message.body, SNIPPET_CHARS),
        );
    }

    prompt.push_str(
        "\nReturn classifications in JSON format: \
         {\"classifications\": [{\"index\": 1, \"tag\": \"urgent\"}, ...]}",
    );
    prompt
}
