//! # mailsense-core
//!
//! Core pipeline for the `MailSense` email assistant.
//!
//! This crate provides:
//! - **Mail cache** - TTL-gated in-memory store of the most recent messages
//! - **Classifier** - background batch tagging of cached messages via the
//!   completion provider, merged back by message id
//! - **Query resolver** - spam summaries and keyword search + contextual
//!   answers over the cached (and possibly classified) messages
//! - **To-do synthesizer** - short action-item lists derived from the top
//!   cached messages, with its own staleness timer
//! - **Assistant** - facade wiring the pipeline together for a route layer

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod classify;
mod error;
pub mod model;
pub mod resolve;
pub mod service;
pub mod todo;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{FETCH_LIMIT, MailCache, STALENESS_WINDOW};
pub use classify::{Classifier, MAX_BATCH};
pub use error::{Error, Result};
pub use mailsense_gmail::{MailSource, Message};
pub use mailsense_llm::CompletionProvider;
pub use model::{Classification, ClassifiedMessage, MessageOverview, Tag};
pub use resolve::QueryResolver;
pub use service::Assistant;
pub use todo::TodoSynthesizer;
