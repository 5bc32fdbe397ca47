use std::sync::Arc;
use std::time::Duration;

use bgg_client::CollectionItem;
use gameshelf_common::CollectionError;
use tracing::{info, warn};

use crate::traits::{CollectionEndpoint, CollectionPoll};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(3);

/// Pulls a user's owned collection, waiting out "still generating" replies.
pub struct CollectionFetcher {
    endpoint: Arc<dyn CollectionEndpoint>,
    max_attempts: u32,
    backoff: Duration,
}

impl CollectionFetcher {
    pub fn new(endpoint: Arc<dyn CollectionEndpoint>) -> Self {
        Self {
            endpoint,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
        }
    }

    pub fn with_retry(mut self, max_attempts: u32, backoff: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.backoff = backoff;
        self
    }

    /// Items in document order; duplicates are kept.
    ///
    /// The handle is never logged.
    pub async fn fetch(&self, username: &str) -> Result<Vec<CollectionItem>, CollectionError> {
        for attempt in 1..=self.max_attempts {
            let poll = self
                .endpoint
                .poll_collection(username)
                .await
                .map_err(|e| CollectionError::Network(e.to_string()))?;

            match poll {
                CollectionPoll::Ready(items) => {
                    info!(attempt, items = items.len(), "Collection fetched");
                    return Ok(items);
                }
                CollectionPoll::Failed { status } => {
                    warn!(attempt, status, "Collection request failed");
                    return Err(CollectionError::Fetch { status });
                }
                CollectionPoll::Generating => {
                    info!(attempt, max = self.max_attempts, "Collection still generating");
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.backoff).await;
                    }
                }
            }
        }

        warn!(attempts = self.max_attempts, "Collection never became ready");
        Err(CollectionError::Timeout {
            attempts: self.max_attempts,
        })
    }
}
