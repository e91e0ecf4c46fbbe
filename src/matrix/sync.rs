//! Long-polling sync loop feeding the event runner.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::events::SyncBatch;
use super::{MatrixClient, MatrixError};
use crate::bot::BotMessage;

/// Pause before retrying a failed sync.
const SYNC_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Anything that can answer a `/sync` long-poll.
#[async_trait]
pub trait SyncSource: Send + Sync {
    async fn sync(&self, since: Option<&str>, timeout: Duration) -> Result<SyncBatch, MatrixError>;
}

#[async_trait]
impl SyncSource for MatrixClient {
    async fn sync(&self, since: Option<&str>, timeout: Duration) -> Result<SyncBatch, MatrixError> {
        Self::sync(self, since, timeout).await
    }
}

/// Polls `/sync` and forwards every event to the runner.
pub struct SyncLoop<S: SyncSource + ?Sized> {
    source: Arc<S>,

    /// Long-poll timeout passed to the homeserver.
    timeout: Duration,

    retry_delay: Duration,
}

impl<S: SyncSource + ?Sized> SyncLoop<S> {
    #[must_use]
    pub const fn new(source: Arc<S>, timeout: Duration) -> Self {
        Self {
            source,
            timeout,
            retry_delay: SYNC_RETRY_DELAY,
        }
    }

    /// Sets the delay used after a failed sync.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Runs until the receiving side of `tx` is dropped.
    ///
    /// The `since` token only advances after a successful sync.
    pub async fn run(&self, tx: mpsc::Sender<BotMessage>) {
        info!("Sync loop started");

        let mut since: Option<String> = None;

        loop {
            match self.source.sync(since.as_deref(), self.timeout).await {
                Ok(batch) => {
                    if !batch.events.is_empty() {
                        debug!("Sync delivered {} events", batch.events.len());
                    }

                    for event in batch.events {
                        if tx.send(BotMessage::Event(event)).await.is_err() {
                            info!("Event runner gone, stopping sync loop");
                            return;
                        }
                    }
                    since = Some(batch.next_batch);
                }
                Err(MatrixError::RateLimited(retry_after_ms)) => {
                    warn!("Sync rate limited, retrying in {} ms", retry_after_ms);
                    tokio::time::sleep(Duration::from_millis(retry_after_ms)).await;
                }
                Err(e) => {
                    error!("Sync failed: {}. Retrying in {:?}", e, self.retry_delay);
                    tokio::time::sleep(self.retry_delay).await;
                }
            }

            if tx.is_closed() {
                info!("Event runner gone, stopping sync loop");
                return;
            }
        }
    }
}

impl<S: SyncSource + ?Sized> std::fmt::Debug for SyncLoop<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncLoop")
            .field("timeout", &self.timeout)
            .field("retry_delay", &self.retry_delay)
            .finish_non_exhaustive()
    }
}
