//! Background processing of scheduled weather queries.
//!
//! The API layer hands query ids to a [`QuerySubmitter`]; the
//! [`ScheduledQueryWorker`] drains the matching channel and gives each query
//! exactly one attempt. Failed attempts leave the record `pending`. Once the
//! channel closes the worker waits for in-flight attempts before it returns.

use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::services::resolver::WeatherResolver;
use crate::services::weather_service::WeatherError;

/// Accepts query ids for out-of-band processing.
pub trait QuerySubmitter: Send + Sync {
    fn submit(&self, query_id: &str) -> Result<(), WeatherError>;
}

/// Submitter backed by an unbounded tokio channel.
#[derive(Clone)]
pub struct ChannelSubmitter {
    tx: mpsc::UnboundedSender<String>,
}

impl QuerySubmitter for ChannelSubmitter {
    fn submit(&self, query_id: &str) -> Result<(), WeatherError> {
        self.tx
            .send(query_id.to_string())
            .map_err(|_| WeatherError::Queue("scheduled query worker is not running".to_string()))
    }
}

/// Creates a connected submitter / receiver pair.
#[must_use]
pub fn channel() -> (ChannelSubmitter, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelSubmitter { tx }, rx)
}

pub struct ScheduledQueryWorker {
    resolver: Arc<WeatherResolver>,
    receiver: mpsc::UnboundedReceiver<String>,
    concurrency: u32,
}

impl ScheduledQueryWorker {
    #[must_use]
    pub fn new(
        resolver: Arc<WeatherResolver>,
        receiver: mpsc::UnboundedReceiver<String>,
        concurrency: usize,
    ) -> Self {
        Self {
            resolver,
            receiver,
            concurrency: u32::try_from(concurrency.max(1)).unwrap_or(u32::MAX),
        }
    }

    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Runs until every submitter has been dropped and all accepted queries
    /// have had their attempt.
    pub async fn run(mut self) {
        info!(concurrency = self.concurrency, "Scheduled query worker started");
        let permits = Arc::new(Semaphore::new(self.concurrency as usize));

        while let Some(query_id) = self.receiver.recv().await {
            let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
                break;
            };
            let resolver = Arc::clone(&self.resolver);

            tokio::spawn(async move {
                process(&resolver, &query_id).await;
                drop(permit);
            });
        }

        // Every permit back means every spawned attempt has finished.
        if permits.acquire_many(self.concurrency).await.is_err() {
            warn!("Scheduled query worker stopped before in-flight queries finished");
            return;
        }

        info!("Scheduled query worker stopped");
    }
}

async fn process(resolver: &WeatherResolver, query_id: &str) {
    match resolver.complete_scheduled(query_id).await {
        Ok(Some(query)) => {
            info!(query_id, city = %query.city_name, "Scheduled query completed");
        }
        Ok(None) => {
            warn!(query_id, "Scheduled query left pending after upstream failure");
        }
        Err(WeatherError::QueryNotFound(_)) => {
            warn!(query_id, "Scheduled query no longer exists");
        }
        Err(e) => {
            error!(query_id, error = %e, "Scheduled query failed");
        }
    }
}
