//! Postgres-backed job queue over the `queue_jobs` table.
//!
//! Contract offered to the pipeline: durable storage, at-least-once
//! delivery (claims from crashed workers are swept back to pending),
//! delayed scheduling via `run_at`, bounded retries with exponential
//! backoff, and dead-lettering with the last error preserved.

use sqlx::{PgConnection, PgPool};
use verdict_core::retry::RetryPolicy;
use verdict_core::types::{DbId, Timestamp};

use crate::models::queue_job::{QueueJob, QueueJobStatus};

const COLUMNS: &str = "id, queue, payload, status_id, attempts, max_attempts, backoff_base_ms, \
                       run_at, claimed_at, finished_at, last_error, created_at, updated_at";

/// What happened to a failed job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDisposition {
    /// Returned to pending, claimable at `run_at`.
    Requeued { run_at: Timestamp },
    /// Retries exhausted; dead-lettered.
    Buried,
}

/// Provides enqueue/claim/settle operations for queue jobs.
pub struct QueueRepo;

impl QueueRepo {
    /// Insert a job, claimable once `delay` has elapsed.
    pub async fn enqueue(
        pool: &PgPool,
        queue: &str,
        payload: &serde_json::Value,
        delay: chrono::Duration,
        policy: &RetryPolicy,
    ) -> Result<QueueJob, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        let run_at = chrono::Utc::now() + delay;
        insert_job(&mut *conn, queue, payload, run_at, policy).await
    }

    /// Claimable-now depth of a queue. Used by tests and diagnostics.
    pub async fn pending_count(pool: &PgPool, queue: &str) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM queue_jobs WHERE queue = $1 AND status_id = $2",
        )
        .bind(queue)
        .bind(QueueJobStatus::Pending.id())
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Claim the oldest runnable job on `queue`, if any.
    ///
    /// The claim marks the job running and counts the delivery, all in
    /// one statement; `FOR UPDATE SKIP LOCKED` keeps concurrent workers
    /// from ever seeing the same job.
    pub async fn claim_next(pool: &PgPool, queue: &str) -> Result<Option<QueueJob>, sqlx::Error> {
        let query = format!(
            "UPDATE queue_jobs
             SET status_id = $1, claimed_at = NOW(), attempts = attempts + 1, updated_at = NOW()
             WHERE id = (
                 SELECT id FROM queue_jobs
                 WHERE queue = $2
                   AND status_id = $3
                   AND claimed_at IS NULL
                   AND run_at <= NOW()
                 ORDER BY run_at ASC, id ASC
                 LIMIT 1
                 FOR UPDATE SKIP LOCKED
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QueueJob>(&query)
            .bind(QueueJobStatus::Running.id())
            .bind(queue)
            .bind(QueueJobStatus::Pending.id())
            .fetch_optional(pool)
            .await
    }

    /// Acknowledge a claimed job as done.
    ///
    /// Returns `false` if the job was no longer running (e.g. the stale
    /// sweep already returned it to pending).
    pub async fn complete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE queue_jobs
             SET status_id = $2, finished_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND status_id = $3",
        )
        .bind(id)
        .bind(QueueJobStatus::Completed.id())
        .bind(QueueJobStatus::Running.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Settle a failed delivery: requeue with exponential backoff, or
    /// dead-letter once the policy's attempts are spent.
    pub async fn retry_or_bury(
        pool: &PgPool,
        job: &QueueJob,
        error: &str,
    ) -> Result<RetryDisposition, sqlx::Error> {
        if job.is_final_attempt() {
            Self::bury(pool, job.id, error).await?;
            return Ok(RetryDisposition::Buried);
        }

        let delay = job.retry_policy().backoff_for_attempt(job.attempts);
        let run_at = chrono::Utc::now() + delay;
        let result = sqlx::query(
            "UPDATE queue_jobs
             SET status_id = $2, claimed_at = NULL, run_at = $3, last_error = $4,
                 updated_at = NOW()
             WHERE id = $1 AND status_id = $5",
        )
        .bind(job.id)
        .bind(QueueJobStatus::Pending.id())
        .bind(run_at)
        .bind(error)
        .bind(QueueJobStatus::Running.id())
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::warn!(job_id = job.id, "Job changed state while being requeued");
        }
        Ok(RetryDisposition::Requeued { run_at })
    }

    /// Dead-letter a job immediately, preserving the failure reason.
    pub async fn bury(pool: &PgPool, id: DbId, error: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE queue_jobs
             SET status_id = $2, finished_at = NOW(), last_error = $3, updated_at = NOW()
             WHERE id = $1 AND status_id <> $2",
        )
        .bind(id)
        .bind(QueueJobStatus::Dead.id())
        .bind(error)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Return jobs claimed before `cutoff` to pending so another worker
    /// can pick them up. Preserves at-least-once delivery across worker
    /// crashes.
    pub async fn requeue_stale(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE queue_jobs
             SET status_id = $1, claimed_at = NULL, updated_at = NOW()
             WHERE status_id = $2 AND claimed_at < $3",
        )
        .bind(QueueJobStatus::Pending.id())
        .bind(QueueJobStatus::Running.id())
        .bind(cutoff)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Find a job by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<QueueJob>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM queue_jobs WHERE id = $1");
        sqlx::query_as::<_, QueueJob>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

/// Shared insert used by [`QueueRepo::enqueue`] and by repositories that
/// enqueue inside their own transactions.
pub(crate) async fn insert_job(
    conn: &mut PgConnection,
    queue: &str,
    payload: &serde_json::Value,
    run_at: Timestamp,
    policy: &RetryPolicy,
) -> Result<QueueJob, sqlx::Error> {
    let query = format!(
        "INSERT INTO queue_jobs (queue, payload, max_attempts, backoff_base_ms, run_at)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, QueueJob>(&query)
        .bind(queue)
        .bind(payload)
        .bind(policy.max_attempts)
        .bind(policy.backoff_base_ms)
        .bind(run_at)
        .fetch_one(conn)
        .await
}
