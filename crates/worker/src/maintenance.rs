//! Periodic requeue of job claims abandoned by crashed workers.
//!
//! A claim older than the cutoff with no settlement means the claiming
//! process died mid-job. Sweeping it back to pending preserves
//! at-least-once delivery; the attempt count survives, so a job cannot
//! crash workers forever.

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use verdict_db::repositories::QueueRepo;

/// How often the sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Run the stale-claim sweep loop until `cancel` is triggered.
pub async fn run(pool: PgPool, stale_claim_secs: i64, cancel: CancellationToken) {
    tracing::info!(
        stale_claim_secs,
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "Stale-claim sweep started"
    );

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Stale-claim sweep stopping");
                break;
            }
            _ = interval.tick() => {
                let cutoff = Utc::now() - chrono::Duration::seconds(stale_claim_secs);
                match QueueRepo::requeue_stale(&pool, cutoff).await {
                    Ok(requeued) if requeued > 0 => {
                        tracing::warn!(requeued, "Requeued stale job claims");
                    }
                    Ok(_) => {
                        tracing::debug!("No stale job claims");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Stale-claim sweep failed");
                    }
                }
            }
        }
    }
}
