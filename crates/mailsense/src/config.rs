//! Environment-driven configuration.

use std::env;

use tracing::warn;

const DEFAULT_PORT: u16 = 5000;

/// Runtime configuration read from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP surface binds to.
    pub port: u16,
    /// API key for the completion endpoint. May be empty; calls then fail
    /// later rather than preventing startup.
    pub openai_api_key: String,
    /// Optional completion endpoint override (local proxies).
    pub openai_base_url: Option<String>,
    /// Optional model name override.
    pub openai_model: Option<String>,
    /// Bearer token for the Gmail API.
    pub gmail_access_token: String,
    /// Optional Gmail endpoint override.
    pub gmail_base_url: Option<String>,
}

impl Config {
    /// Read configuration from the environment.
    ///
    /// Missing credentials produce startup warnings, not failures; the
    /// affected collaborator calls simply fail later and the pipeline
    /// degrades per its error policy.
    #[must_use]
    pub fn from_env() -> Self {
        let port = env::var("MAILSENSE_PORT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let openai_api_key = env::var("OPENAI_API_KEY").unwrap_or_default();
        if openai_api_key.is_empty() {
            warn!("OPENAI_API_KEY not set; completion calls will fail");
        }

        let gmail_access_token = env::var("GMAIL_ACCESS_TOKEN").unwrap_or_default();
        if gmail_access_token.is_empty() {
            warn!("GMAIL_ACCESS_TOKEN not set; mail fetches will fail");
        }

        Self {
            port,
            openai_api_key,
            openai_base_url: env::var("OPENAI_BASE_URL").ok(),
            openai_model: env::var("OPENAI_MODEL").ok(),
            gmail_access_token,
            gmail_base_url: env::var("GMAIL_BASE_URL").ok(),
        }
    }
}
