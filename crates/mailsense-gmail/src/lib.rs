//! # mailsense-gmail
//!
//! Gmail REST mail source for the `MailSense` assistant.
//!
//! This crate provides:
//! - The [`MailSource`] contract: fetch the N most recent messages,
//!   newest-first, with ids unique within one call
//! - [`GmailClient`], a thin wrapper over the Gmail REST API that lists
//!   recent message ids, fetches each message, and extracts sender, subject,
//!   plain-text body, and timestamp

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod client;
mod error;
pub mod source;

pub use client::GmailClient;
pub use error::{MailError, Result};
pub use source::{MailSource, Message};
