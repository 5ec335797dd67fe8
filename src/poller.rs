//! Fixed-interval status polling
//!
//! Repeats `GET /repositories/{id}` until the backend reports `ready` or
//! `error`, handing every snapshot to a [`PollObserver`].

use crate::client::AnalyzerApi;
use crate::config::PollingConfig;
use crate::error::PollError;
use crate::types::Repository;

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Receives every repository snapshot fetched while polling
#[async_trait]
pub trait PollObserver: Send + Sync {
    async fn on_update(&self, repository: &Repository, attempt: u32);
}

/// Observer that ignores updates
pub struct NoopObserver;

#[async_trait]
impl PollObserver for NoopObserver {
    async fn on_update(&self, _repository: &Repository, _attempt: u32) {}
}

/// Final snapshot of a completed polling loop
#[derive(Debug, Clone)]
pub struct PollOutcome {
    /// Repository in a terminal state (ready or error)
    pub repository: Repository,
    /// Number of status requests made, failed ones included
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Polls a repository until its analysis finishes
#[derive(Debug, Clone)]
pub struct StatusPoller {
    interval: Duration,
    max_attempts: u32,
    max_consecutive_errors: u32,
}

impl Default for StatusPoller {
    fn default() -> Self {
        Self::from_config(&PollingConfig::default())
    }
}

impl StatusPoller {
    pub fn from_config(config: &PollingConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.interval_ms),
            max_attempts: config.max_attempts.max(1),
            max_consecutive_errors: config.max_consecutive_errors.max(1),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Poll until the repository reaches a terminal state
    ///
    /// The first request is sent one interval after the call. Each snapshot is
    /// passed to `observer` before the terminal check.
    pub async fn poll_until_done<A, O>(
        &self,
        api: &A,
        repo_id: &str,
        observer: &O,
        cancel: &CancellationToken,
    ) -> Result<PollOutcome, PollError>
    where
        A: AnalyzerApi + ?Sized,
        O: PollObserver + ?Sized,
    {
        let start = Instant::now();
        let mut consecutive_errors = 0u32;
        let mut last_status = String::from("unknown");

        for attempt in 1..=self.max_attempts {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("Polling for {} cancelled after {} attempts", repo_id, attempt - 1);
                    return Err(PollError::Cancelled);
                }
                _ = tokio::time::sleep(self.interval) => {}
            }

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("Polling for {} cancelled during attempt {}", repo_id, attempt);
                    return Err(PollError::Cancelled);
                }
                result = api.get_repository(repo_id) => result,
            };

            match result {
                Ok(repository) => {
                    consecutive_errors = 0;
                    tracing::debug!(
                        "Poll {} for {}: status {}",
                        attempt,
                        repo_id,
                        repository.status
                    );

                    observer.on_update(&repository, attempt).await;

                    if repository.status.is_terminal() {
                        tracing::info!(
                            "Repository {} finished with status {} after {} polls",
                            repo_id,
                            repository.status,
                            attempt
                        );
                        return Ok(PollOutcome {
                            repository,
                            attempts: attempt,
                            elapsed: start.elapsed(),
                        });
                    }

                    last_status = repository.status.to_string();
                }
                Err(e) => {
                    consecutive_errors += 1;
                    tracing::error!("Polling error for {}: {}", repo_id, e);

                    if consecutive_errors >= self.max_consecutive_errors {
                        return Err(PollError::Request {
                            attempts: attempt,
                            source: e,
                        });
                    }
                }
            }
        }

        Err(PollError::Exhausted {
            attempts: self.max_attempts,
            last_status,
        })
    }
}
