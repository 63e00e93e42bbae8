//! Generic queue consumer.
//!
//! Polls one queue on a fixed interval and fans claimed jobs out to a
//! handler, at most `concurrency` in flight. Claims rely on
//! `FOR UPDATE SKIP LOCKED` inside [`QueueRepo::claim_next`], so any
//! number of runner processes can share a queue without double
//! delivery.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use verdict_core::outcome::JobOutcome;
use verdict_db::models::queue_job::QueueJob;
use verdict_db::repositories::{QueueRepo, RetryDisposition};

/// Default polling interval for runner loops.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// A consumer for one queue.
///
/// Handlers map every failure to a [`JobOutcome`] instead of an error:
/// the runner owns the queue row's fate, the handler only reports what
/// happened.
#[async_trait]
pub trait JobHandler: Send + Sync {
    /// Queue this handler consumes.
    fn queue(&self) -> &'static str;

    /// Process one claimed job.
    async fn handle(&self, job: &QueueJob) -> JobOutcome;
}

/// Long-lived polling loop feeding one [`JobHandler`].
pub struct QueueRunner {
    pool: PgPool,
    handler: Arc<dyn JobHandler>,
    concurrency: usize,
    poll_interval: Duration,
}

impl QueueRunner {
    /// Create a runner with the default 1-second poll interval.
    pub fn new(pool: PgPool, handler: Arc<dyn JobHandler>, concurrency: usize) -> Self {
        Self {
            pool,
            handler,
            concurrency,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the polling interval.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Run the consumer loop until the cancellation token is triggered,
    /// then wait for in-flight jobs to finish.
    pub async fn run(&self, cancel: CancellationToken) {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut ticker = tokio::time::interval(self.poll_interval);
        tracing::info!(
            queue = self.handler.queue(),
            concurrency = self.concurrency,
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Queue runner started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(queue = self.handler.queue(), "Queue runner shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.claim_available(&semaphore).await;
                }
            }
        }

        // Drain: every permit back means every spawned job has settled.
        let _ = semaphore.acquire_many(self.concurrency as u32).await;
        tracing::info!(queue = self.handler.queue(), "Queue runner drained");
    }

    /// Claim and spawn ready jobs until the queue is empty or all
    /// permits are taken.
    async fn claim_available(&self, semaphore: &Arc<Semaphore>) {
        loop {
            let Ok(permit) = Arc::clone(semaphore).try_acquire_owned() else {
                break;
            };
            match QueueRepo::claim_next(&self.pool, self.handler.queue()).await {
                Ok(Some(job)) => {
                    tracing::debug!(
                        queue = self.handler.queue(),
                        job_id = job.id,
                        attempt = job.attempts,
                        "Job claimed",
                    );
                    let pool = self.pool.clone();
                    let handler = Arc::clone(&self.handler);
                    tokio::spawn(async move {
                        let _permit = permit;
                        process_job(&pool, handler.as_ref(), &job).await;
                    });
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(
                        queue = self.handler.queue(),
                        error = %e,
                        "Failed to claim job",
                    );
                    break;
                }
            }
        }
    }
}

/// Run one claimed job through its handler and settle the queue row
/// according to the outcome.
pub async fn process_job(pool: &PgPool, handler: &dyn JobHandler, job: &QueueJob) {
    match handler.handle(job).await {
        JobOutcome::Success => match QueueRepo::complete(pool, job.id).await {
            Ok(true) => {
                tracing::debug!(queue = %job.queue, job_id = job.id, "Job completed");
            }
            Ok(false) => {
                // Stale sweep or a competing settle got here first.
                tracing::warn!(
                    queue = %job.queue,
                    job_id = job.id,
                    "Job was no longer running at completion",
                );
            }
            Err(e) => {
                tracing::error!(queue = %job.queue, job_id = job.id, error = %e, "Failed to complete job");
            }
        },
        JobOutcome::Retry { reason } => match QueueRepo::retry_or_bury(pool, job, &reason).await {
            Ok(RetryDisposition::Requeued { run_at }) => {
                tracing::info!(
                    queue = %job.queue,
                    job_id = job.id,
                    attempt = job.attempts,
                    retry_at = %run_at,
                    reason = %reason,
                    "Job requeued with backoff",
                );
            }
            Ok(RetryDisposition::Buried) => {
                tracing::warn!(
                    queue = %job.queue,
                    job_id = job.id,
                    attempts = job.attempts,
                    reason = %reason,
                    "Job dead-lettered after exhausting retries",
                );
            }
            Err(e) => {
                tracing::error!(queue = %job.queue, job_id = job.id, error = %e, "Failed to requeue job");
            }
        },
        JobOutcome::Fatal { reason } => match QueueRepo::bury(pool, job.id, &reason).await {
            Ok(_) => {
                tracing::warn!(
                    queue = %job.queue,
                    job_id = job.id,
                    reason = %reason,
                    "Job dead-lettered",
                );
            }
            Err(e) => {
                tracing::error!(queue = %job.queue, job_id = job.id, error = %e, "Failed to bury job");
            }
        },
    }
}
