//! Free-text query resolution.
//!
//! Routes a query to either the spam-summary path (deterministic, served
//! from the classification store with no model call) or the search path
//! (keyword selection over the cache, classified records substituted by id,
//! one contextual completion call). Completion failures on the search path
//! come back as answer text; the answer channel doubles as the error
//! channel so the caller always gets a response.

use std::fmt::Write as _;
use std::sync::Arc;

use tracing::{debug, warn};

use mailsense_gmail::Message;
use mailsense_llm::CompletionProvider;

use crate::cache::MailCache;
use crate::classify::Classifier;
use crate::error::{Error, Result};
use crate::model::{Classification, snippet};

const ANSWER_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that answers questions about emails.";
const ANSWER_MAX_TOKENS: u32 = 400;
const ANSWER_TEMPERATURE: f32 = 0.7;

/// How many messages a prompt may carry.
const CONTEXT_MESSAGES: usize = 10;
/// Fallback context size when keyword search comes up empty.
const FALLBACK_RECENT: usize = 10;
const SNIPPET_CHARS: usize = 150;

const SPAM_SUMMARY_LIMIT: usize = 5;
const NO_SPAM_ANSWER: &str = "No spam found in your recent emails.";
/// Tokens that route a query to the spam-summary path.
const SPAM_TOKENS: &[&str] = &["spam", "\u{5783}\u{573e}\u{90ae}\u{4ef6}"];

/// Resolves free-text questions against the cached mailbox.
pub struct QueryResolver {
    cache: Arc<MailCache>,
    classifier: Arc<Classifier>,
    provider: Arc<dyn CompletionProvider>,
}

impl QueryResolver {
    /// Wire a resolver over the shared cache, classifier, and provider.
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
        }
    }

    /// Answer a free-text query about the cached mailbox.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyQuery`] if the query is blank after trimming.
    /// All other failures degrade into the answer text.
    pub async fn answer(&self, query: &str) -> Result<String> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::EmptyQuery);
        }

        self.cache.refresh(false).await;

        if is_spam_query(query) {
            debug!("taking the spam-summary path");
            Ok(self.spam_summary().await)
        } else {
            Ok(self.search_answer(query).await)
        }
    }

    /// Deterministic spam summary from the classification store.
    ///
    /// No model call: either the fixed no-spam answer or up to five summary
    /// lines over the entries currently flagged as spam.
    async fn spam_summary(&self) -> String {
        let spam = self.classifier.spam_entries().await;
        if spam.is_empty() {
            return NO_SPAM_ANSWER.to_string();
        }

        let mut answer = format!("Found {} spam email(s) in your recent mail:\n", spam.len());
        for entry in spam.iter().take(SPAM_SUMMARY_LIMIT) {
            let _ = writeln!(
                answer,
                "- From {}: \"{}\"",
                entry.message.sender, entry.message.subject
            );
        }
        answer.trim_end().to_string()
    }

    /// Keyword search plus one contextual completion call.
    async fn search_answer(&self, query: &str) -> String {
        let messages = self.cache.messages().await;
        let mut relevant = search_messages(&messages, query);
        if relevant.is_empty() {
            // Never send the model an empty context.
            relevant = messages.into_iter().take(FALLBACK_RECENT).collect();
        }

        let joined = self.classifier.join(relevant).await;
        let prompt = build_answer_prompt(&joined, query);

        match self
            .provider
            .complete(
                ANSWER_SYSTEM_PROMPT,
                &prompt,
                ANSWER_MAX_TOKENS,
                ANSWER_TEMPERATURE,
            )
            .await
        {
            Ok(answer) => answer,
            Err(err) => {
                warn!(%err, "completion failed while answering query");
                format!("Error processing question: {err}")
            }
        }
    }
}

/// Whether the query asks about spam.
fn is_spam_query(query: &str) -> bool {
    let lower = query.to_lowercase();
    SPAM_TOKENS.iter().any(|token| lower.contains(token))
}

/// Case-insensitive OR keyword search over `subject + body`.
#[must_use]
pub fn search_messages(messages: &[Message], query: &str) -> Vec<Message> {
    let keywords: Vec<String> = query
        .to_lowercase()
        .split_whitespace()
        .map(ToString::to_string)
        .collect();

    messages
        .iter()
        .filter(|message| {
            let haystack = format!("{} {}", message.subject, message.body).to_lowercase();
            keywords.iter().any(|keyword| haystack.contains(keyword))
        })
        .cloned()
        .collect()
}

/// Render the deterministic answer prompt: preamble, up to ten message
/// blocks (classified tag shown when present), the literal query, and the
/// fixed answer instruction.
fn build_answer_prompt(joined: &[(Message, Option<Classification>)], query: &str) -> String {
    let mut prompt = String::from("Here are the most recent emails:\n\n");

    for (i, (message, classification)) in joined.iter().take(CONTEXT_MESSAGES).enumerate() {
        let tag_info = classification.map_or_else(String::new, |c| {
            format!(" [{} {}]", c.tag.emoji(), capitalize(c.tag.as_str()))
        });

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

    let _ = write!(
        prompt,
        "User question: {query}\n\n\
         Please answer the user's question in a helpful tone.\n\
         Then, add a summary of what the emails are about and suggest one helpful action the user might take.\n\
         Format your reply like this:\n\
         Summary: ...\n\
         Suggested Action: ..."
    );

    prompt
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}
