//! Shared test doubles for the pipeline.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use mailsense_gmail::{MailError, MailSource, Message};
use mailsense_llm::{CompletionProvider, LlmError};

/// Build a message with a fixed timestamp-free shape for tests.
pub fn message(id: &str, sender: &str, subject: &str, body: &str) -> Message {
    Message {
        id: id.to_string(),
        sender: sender.to_string(),
        subject: subject.to_string(),
        body: body.to_string(),
        timestamp: Utc::now(),
    }
}

/// Mail source double with a call counter and switchable failure mode.
pub struct MockMailSource {
    calls: AtomicUsize,
    fail: AtomicBool,
    messages: std::sync::Mutex<Vec<Message>>,
}

impl MockMailSource {
    pub fn with_messages(messages: Vec<Message>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
            messages: std::sync::Mutex::new(messages),
        })
    }

    pub fn set_messages(&self, messages: Vec<Message>) {
        *self.messages.lock().unwrap() = messages;
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MailSource for MockMailSource {
    async fn fetch_recent(&self, max: usize) -> mailsense_gmail::Result<Vec<Message>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(MailError::Decode("mock mail failure".to_string()));
        }
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .take(max)
            .cloned()
            .collect())
    }
}

/// Completion provider double recording calls and prompts.
pub struct MockProvider {
    complete_calls: AtomicUsize,
    structured_calls: AtomicUsize,
    fail: AtomicBool,
    answer: std::sync::Mutex<String>,
    structured: std::sync::Mutex<Option<serde_json::Value>>,
    last_prompt: std::sync::Mutex<Option<String>>,
}

impl MockProvider {
    pub fn arc() -> Arc<Self> {
        Arc::new(Self {
            complete_calls: AtomicUsize::new(0),
            structured_calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
            answer: std::sync::Mutex::new("ANSWER".to_string()),
            structured: std::sync::Mutex::new(None),
            last_prompt: std::sync::Mutex::new(None),
        })
    }

    pub fn set_answer(&self, answer: &str) {
        *self.answer.lock().unwrap() = answer.to_string();
    }

    pub fn set_structured(&self, value: serde_json::Value) {
        *self.structured.lock().unwrap() = Some(value);
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// How many free-text completion calls were made.
    pub fn complete_calls(&self) -> usize {
        self.complete_calls.load(Ordering::SeqCst)
    }

    /// The user prompt of the most recent free-text completion call.
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(
        &self,
        _system_prompt: &str,
        user_prompt: &str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> mailsense_llm::Result<String> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(user_prompt.to_string());
        if self.fail.load(Ordering::SeqCst) {
            return Err(LlmError::MalformedResponse("mock completion failure".to_string()));
        }
        Ok(self.answer.lock().unwrap().clone())
    }

    async fn complete_structured(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
    ) -> mailsense_llm::Result<serde_json::Value> {
        self.structured_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(LlmError::MalformedResponse("mock completion failure".to_string()));
        }
        self.structured
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| LlmError::MalformedResponse("no structured response queued".to_string()))
    }
}
