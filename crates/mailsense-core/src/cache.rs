//! TTL-gated in-memory mail cache.
//!
//! Owns the set of recently fetched messages and decides when to go back to
//! the mail provider. A refresh replaces the message list wholesale; ids
//! that scrolled out of the provider's "most recent N" window silently drop
//! out. Provider failures are swallowed so the pipeline keeps serving stale
//! data instead of failing requests.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{info, warn};

use mailsense_gmail::{MailSource, Message};

use crate::classify::{Classifier, MAX_BATCH};

/// How long a successful fetch stays fresh.
pub const STALENESS_WINDOW: Duration = Duration::from_secs(300);

/// How many messages to request from the provider per refresh.
pub const FETCH_LIMIT: usize = 100;

/// In-memory cache of the most recent messages, newest first.
pub struct MailCache {
    source: Arc<dyn MailSource>,
    classifier: Arc<Classifier>,
    state: RwLock<CacheState>,
}

#[derive(Default)]
struct CacheState {
    messages: Vec<Message>,
    fetched_at: Option<Instant>,
}

impl MailCache {
    /// Create an empty cache over the given provider.
    ///
    /// The classifier is re-run in the background after every successful
    /// refresh; it never blocks the refresh itself.
    #[must_use]
    pub fn new(source: Arc<dyn MailSource>, classifier: Arc<Classifier>) -> Self {
        Self {
            source,
            classifier,
            state: RwLock::new(CacheState::default()),
        }
    }

    /// Refresh the cache from the mail provider.
    ///
    /// A no-op inside the staleness window unless `force` is set. On
    /// success the message list is replaced atomically, the staleness timer
    /// resets, and classification of the new snapshot is spawned
    /// fire-and-forget. On provider failure the previous contents are
    /// retained and the failure is only logged.
    ///
    /// Returns whether the cache contents were replaced.
    pub async fn refresh(&self, force: bool) -> bool {
        if !force {
            let state = self.state.read().await;
            if let Some(fetched_at) = state.fetched_at
                && fetched_at.elapsed() < STALENESS_WINDOW
            {
                return false;
            }
        }

        let messages = match self.source.fetch_recent(FETCH_LIMIT).await {
            Ok(messages) => messages,
            Err(err) => {
                warn!(%err, "mail refresh failed, keeping stale cache");
                return false;
            }
        };

        info!(count = messages.len(), "mail cache refreshed");
        let batch: Vec<Message> = messages.iter().take(MAX_BATCH).cloned().collect();

        {
            let mut state = self.state.write().await;
            state.messages = messages;
            state.fetched_at = Some(Instant::now());
        }

        let classifier = Arc::clone(&self.classifier);
        tokio::spawn(async move {
            classifier.classify(batch, MAX_BATCH).await;
        });

        true
    }

    /// First `n` messages of the current cache (possibly fewer).
    pub async fn get_recent(&self, n: usize) -> Vec<Message> {
        let state = self.state.read().await;
        state.messages.iter().take(n).cloned().collect()
    }

    /// All currently cached messages, newest first.
    pub async fn messages(&self) -> Vec<Message> {
        self.state.read().await.messages.clone()
    }
}
