//! `MailSense` - Email assistant backend
//!
//! Caches recent Gmail messages, classifies them in the background, and
//! answers free-text queries for the companion browser extension.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod config;
mod server;

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mailsense_core::Assistant;
use mailsense_gmail::GmailClient;
use mailsense_llm::OpenAiProvider;

use config::Config;
use server::{AppState, build_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailsense=debug,mailsense_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting MailSense");

    let config = Config::from_env();

    let mut gmail = GmailClient::new(config.gmail_access_token.clone());
    if let Some(base_url) = &config.gmail_base_url {
        gmail = gmail.with_base_url(base_url.clone());
    }

    let mut provider = OpenAiProvider::new(config.openai_api_key.clone());
    if let Some(base_url) = &config.openai_base_url {
        provider = provider.with_base_url(base_url.clone());
    }
    if let Some(model) = &config.openai_model {
        provider = provider.with_model(model.clone());
    }

    let assistant = Arc::new(Assistant::new(Arc::new(gmail), Arc::new(provider)));

    // Warm the cache so the first request does not pay the fetch cost.
    assistant.refresh(true).await;

    let app = build_router(AppState { assistant });

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
