//! # mailsense-llm
//!
//! Completion provider contract and OpenAI-compatible chat client.
//!
//! The rest of the system treats the language model as a black box behind
//! [`CompletionProvider`]: one free-text completion call and one structured
//! (JSON object) variant used for batch classification.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
pub mod openai;
pub mod provider;

pub use error::{LlmError, Result};
pub use openai::OpenAiProvider;
pub use provider::CompletionProvider;
