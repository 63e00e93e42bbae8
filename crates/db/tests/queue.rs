//! Integration tests for the Postgres-backed job queue.
//!
//! Exercises the delivery contract end to end: claim semantics, delayed
//! scheduling, bounded retries with exponential backoff, dead-lettering,
//! and stale-claim recovery.

use chrono::Utc;
use sqlx::PgPool;
use verdict_core::retry::RetryPolicy;
use verdict_db::models::queue_job::{QueueJob, QueueJobStatus};
use verdict_db::repositories::{QueueRepo, RetryDisposition};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const TEST_QUEUE: &str = "test-queue";

async fn enqueue_now(pool: &PgPool, policy: &RetryPolicy) -> QueueJob {
    QueueRepo::enqueue(
        pool,
        TEST_QUEUE,
        &serde_json::json!({ "k": "v" }),
        chrono::Duration::zero(),
        policy,
    )
    .await
    .unwrap()
}

/// Make a scheduled-in-the-future job claimable right now.
async fn rewind_run_at(pool: &PgPool, job_id: i64) {
    sqlx::query("UPDATE queue_jobs SET run_at = NOW() WHERE id = $1")
        .bind(job_id)
        .execute(pool)
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Claim semantics
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn test_enqueue_then_claim(pool: PgPool) {
    let policy = RetryPolicy::new(3, 1000);
    let enqueued = enqueue_now(&pool, &policy).await;
    assert_eq!(enqueued.status_id, QueueJobStatus::Pending.id());
    assert_eq!(enqueued.attempts, 0);
    assert_eq!(enqueued.max_attempts, 3);
    assert_eq!(enqueued.backoff_base_ms, 1000);

    let claimed = QueueRepo::claim_next(&pool, TEST_QUEUE)
        .await
        .unwrap()
        .expect("job should be claimable");
    assert_eq!(claimed.id, enqueued.id);
    assert_eq!(claimed.status_id, QueueJobStatus::Running.id());
    assert_eq!(claimed.attempts, 1);
    assert!(claimed.claimed_at.is_some());
    assert_eq!(claimed.payload, serde_json::json!({ "k": "v" }));

    // Nothing left to claim
    assert!(QueueRepo::claim_next(&pool, TEST_QUEUE).await.unwrap().is_none());
}

#[sqlx::test]
async fn test_claims_come_in_schedule_order(pool: PgPool) {
    let policy = RetryPolicy::new(3, 1000);
    let first = enqueue_now(&pool, &policy).await;
    let second = enqueue_now(&pool, &policy).await;

    let a = QueueRepo::claim_next(&pool, TEST_QUEUE).await.unwrap().unwrap();
    let b = QueueRepo::claim_next(&pool, TEST_QUEUE).await.unwrap().unwrap();
    assert_eq!(a.id, first.id);
    assert_eq!(b.id, second.id);
}

#[sqlx::test]
async fn test_claim_ignores_other_queues(pool: PgPool) {
    let policy = RetryPolicy::new(3, 1000);
    enqueue_now(&pool, &policy).await;
    assert!(QueueRepo::claim_next(&pool, "another-queue")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test]
async fn test_delayed_job_is_not_claimable_until_run_at(pool: PgPool) {
    let policy = RetryPolicy::new(3, 1000);
    let job = QueueRepo::enqueue(
        &pool,
        TEST_QUEUE,
        &serde_json::json!({}),
        chrono::Duration::milliseconds(5000),
        &policy,
    )
    .await
    .unwrap();
    assert!(job.run_at > Utc::now());

    assert!(QueueRepo::claim_next(&pool, TEST_QUEUE).await.unwrap().is_none());
    assert_eq!(QueueRepo::pending_count(&pool, TEST_QUEUE).await.unwrap(), 1);

    rewind_run_at(&pool, job.id).await;
    assert!(QueueRepo::claim_next(&pool, TEST_QUEUE).await.unwrap().is_some());
}

// ---------------------------------------------------------------------------
// Settlement
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn test_complete_acknowledges_once(pool: PgPool) {
    let policy = RetryPolicy::new(3, 1000);
    let job = enqueue_now(&pool, &policy).await;
    QueueRepo::claim_next(&pool, TEST_QUEUE).await.unwrap().unwrap();

    assert!(QueueRepo::complete(&pool, job.id).await.unwrap());
    assert!(!QueueRepo::complete(&pool, job.id).await.unwrap());

    let settled = QueueRepo::find_by_id(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(settled.status_id, QueueJobStatus::Completed.id());
    assert!(settled.finished_at.is_some());
}

#[sqlx::test]
async fn test_retry_schedule_doubles_then_buries(pool: PgPool) {
    let policy = RetryPolicy::new(3, 1000);
    let job = enqueue_now(&pool, &policy).await;

    // Attempt 1 fails: backoff = base
    let claimed = QueueRepo::claim_next(&pool, TEST_QUEUE).await.unwrap().unwrap();
    let before = Utc::now();
    let disposition = QueueRepo::retry_or_bury(&pool, &claimed, "boom 1").await.unwrap();
    match disposition {
        RetryDisposition::Requeued { run_at } => {
            let delay_ms = (run_at - before).num_milliseconds();
            assert!((900..=1500).contains(&delay_ms), "attempt 1 delay {delay_ms}ms");
        }
        other => panic!("expected requeue, got {other:?}"),
    }
    // Backoff means not immediately claimable
    assert!(QueueRepo::claim_next(&pool, TEST_QUEUE).await.unwrap().is_none());

    // Attempt 2 fails: backoff = 2 * base
    rewind_run_at(&pool, job.id).await;
    let claimed = QueueRepo::claim_next(&pool, TEST_QUEUE).await.unwrap().unwrap();
    assert_eq!(claimed.attempts, 2);
    assert_eq!(claimed.last_error.as_deref(), Some("boom 1"));
    let before = Utc::now();
    match QueueRepo::retry_or_bury(&pool, &claimed, "boom 2").await.unwrap() {
        RetryDisposition::Requeued { run_at } => {
            let delay_ms = (run_at - before).num_milliseconds();
            assert!((1900..=2500).contains(&delay_ms), "attempt 2 delay {delay_ms}ms");
        }
        other => panic!("expected requeue, got {other:?}"),
    }

    // Attempt 3 is the last: dead-letter
    rewind_run_at(&pool, job.id).await;
    let claimed = QueueRepo::claim_next(&pool, TEST_QUEUE).await.unwrap().unwrap();
    assert_eq!(claimed.attempts, 3);
    assert!(claimed.is_final_attempt());
    assert_eq!(
        QueueRepo::retry_or_bury(&pool, &claimed, "boom 3").await.unwrap(),
        RetryDisposition::Buried
    );

    let dead = QueueRepo::find_by_id(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(dead.status_id, QueueJobStatus::Dead.id());
    assert_eq!(dead.last_error.as_deref(), Some("boom 3"));
    assert!(dead.finished_at.is_some());
    assert!(QueueRepo::claim_next(&pool, TEST_QUEUE).await.unwrap().is_none());
}

#[sqlx::test]
async fn test_bury_dead_letters_immediately(pool: PgPool) {
    let policy = RetryPolicy::new(3, 1000);
    let job = enqueue_now(&pool, &policy).await;
    QueueRepo::claim_next(&pool, TEST_QUEUE).await.unwrap().unwrap();

    assert!(QueueRepo::bury(&pool, job.id, "malformed payload").await.unwrap());
    let dead = QueueRepo::find_by_id(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(dead.status_id, QueueJobStatus::Dead.id());
    assert_eq!(dead.last_error.as_deref(), Some("malformed payload"));

    // Burying a dead job is a no-op
    assert!(!QueueRepo::bury(&pool, job.id, "again").await.unwrap());
}

// ---------------------------------------------------------------------------
// Stale-claim recovery
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn test_requeue_stale_returns_abandoned_claims(pool: PgPool) {
    let policy = RetryPolicy::new(3, 1000);
    let job = enqueue_now(&pool, &policy).await;
    QueueRepo::claim_next(&pool, TEST_QUEUE).await.unwrap().unwrap();

    // Cutoff in the past: the fresh claim is not stale yet
    let past_cutoff = Utc::now() - chrono::Duration::minutes(5);
    assert_eq!(QueueRepo::requeue_stale(&pool, past_cutoff).await.unwrap(), 0);

    // Cutoff in the future: the claim counts as stale
    let future_cutoff = Utc::now() + chrono::Duration::minutes(5);
    assert_eq!(QueueRepo::requeue_stale(&pool, future_cutoff).await.unwrap(), 1);

    // Redelivered with the attempt count preserved
    let reclaimed = QueueRepo::claim_next(&pool, TEST_QUEUE).await.unwrap().unwrap();
    assert_eq!(reclaimed.id, job.id);
    assert_eq!(reclaimed.attempts, 2);
}
