//! Repository for the `submissions` table.
//!
//! The two multi-statement operations here carry the pipeline's
//! atomicity requirements: a submission row and its provisioning job are
//! created in one transaction, and a terminal result update enqueues its
//! cleanup job in one transaction. Both rely on single-row UPDATE
//! atomicity rather than client-side locking.

use sqlx::PgPool;
use uuid::Uuid;
use verdict_core::messages::{
    CleanupJob, ResultPayload, SubmissionJob, CLEANUP_QUEUE, SUBMISSION_QUEUE,
};
use verdict_core::retry::{RetryPolicy, SUBMISSION_RETRY_POLICY};
use verdict_core::status::SubmissionStatus;
use verdict_core::types::{DbId, SubmissionId};

use crate::models::submission::{CreateSubmission, Submission, SubmissionForExecution};
use crate::repositories::queue_repo::insert_job;

const COLUMNS: &str = "id, problem_id, user_id, language_id, source_code, status, \
                       test_cases_passed, stdout, runtime, memory_usage, error_message, \
                       created_at, updated_at";

/// Default page size for submission listings.
const DEFAULT_LIMIT: i64 = 50;

/// Hard cap on submission listing page size.
const MAX_LIMIT: i64 = 200;

/// Outcome of applying a result payload to a submission.
#[derive(Debug, Clone)]
pub enum ResultApplication {
    /// The update was applied; `cleanup_enqueued` is true when this write
    /// made the submission terminal.
    Applied {
        submission: Submission,
        cleanup_enqueued: bool,
    },
    /// The submission was already terminal; nothing was written. Carries
    /// the row as stored.
    AlreadyTerminal(Submission),
    /// No such submission.
    NotFound,
}

/// Provides CRUD and pipeline state transitions for submissions.
pub struct SubmissionRepo;

impl SubmissionRepo {
    /// Insert a submission in `Queued` and enqueue its provisioning job,
    /// atomically. Either both exist afterwards or neither does.
    pub async fn create_queued(
        pool: &PgPool,
        input: &CreateSubmission,
    ) -> Result<Submission, sqlx::Error> {
        let id = Uuid::new_v4();
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO submissions (id, problem_id, user_id, language_id, source_code, status)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let submission = sqlx::query_as::<_, Submission>(&query)
            .bind(id)
            .bind(input.problem_id)
            .bind(input.user_id)
            .bind(input.language_id)
            .bind(&input.source_code)
            .bind(SubmissionStatus::Queued.as_str())
            .fetch_one(&mut *tx)
            .await?;

        let job = SubmissionJob { submission_id: id };
        insert_job(
            &mut *tx,
            SUBMISSION_QUEUE,
            &job.payload(),
            chrono::Utc::now(),
            &SUBMISSION_RETRY_POLICY,
        )
        .await?;

        tx.commit().await?;
        Ok(submission)
    }

    /// Find a submission by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: SubmissionId,
    ) -> Result<Option<Submission>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM submissions WHERE id = $1");
        sqlx::query_as::<_, Submission>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The provisioner's view: submission plus the language extension,
    /// joined in one round trip.
    pub async fn find_for_execution(
        pool: &PgPool,
        id: SubmissionId,
    ) -> Result<Option<SubmissionForExecution>, sqlx::Error> {
        sqlx::query_as::<_, SubmissionForExecution>(
            "SELECT s.id, s.problem_id, s.status, l.extension AS language_extension
             FROM submissions s
             JOIN languages l ON l.id = s.language_id
             WHERE s.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// List a user's submissions, newest first, optionally filtered by
    /// problem.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
        problem_id: Option<DbId>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Submission>, sqlx::Error> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = offset.unwrap_or(0).max(0);
        let query = format!(
            "SELECT {COLUMNS} FROM submissions
             WHERE user_id = $1 AND ($2::BIGINT IS NULL OR problem_id = $2)
             ORDER BY created_at DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Submission>(&query)
            .bind(user_id)
            .bind(problem_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Provisioner transition `Queued -> Processing`.
    ///
    /// Returns `false` when the row was not in `Queued` (already
    /// processing from an earlier delivery, or terminal); callers treat
    /// that as a no-op, not an error.
    pub async fn mark_processing(pool: &PgPool, id: SubmissionId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE submissions SET status = $2, updated_at = NOW()
             WHERE id = $1 AND status = $3",
        )
        .bind(id)
        .bind(SubmissionStatus::Processing.as_str())
        .bind(SubmissionStatus::Queued.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Terminal transition `Queued -> Error` used when provisioning has
    /// definitively failed (final delivery of the job).
    pub async fn mark_provisioning_failed(
        pool: &PgPool,
        id: SubmissionId,
        message: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE submissions SET status = $2, error_message = $3, updated_at = NOW()
             WHERE id = $1 AND status = $4",
        )
        .bind(id)
        .bind(SubmissionStatus::Error.as_str())
        .bind(message)
        .bind(SubmissionStatus::Queued.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Apply a result callback under the first-terminal-wins rule, and
    /// enqueue the cleanup job when (and only when) this write made the
    /// submission terminal.
    ///
    /// The status gate and the cleanup insert share one transaction, so
    /// duplicate deliveries can never produce a second cleanup job: only
    /// one writer ever sees a non-terminal row.
    pub async fn apply_result(
        pool: &PgPool,
        id: SubmissionId,
        payload: &ResultPayload,
        cleanup_delay: chrono::Duration,
        cleanup_policy: &RetryPolicy,
    ) -> Result<ResultApplication, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let update = format!(
            "UPDATE submissions
             SET status = $2, test_cases_passed = $3, stdout = $4, runtime = $5,
                 memory_usage = $6, error_message = $7, updated_at = NOW()
             WHERE id = $1 AND status <> $8 AND status <> $9
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Submission>(&update)
            .bind(id)
            .bind(payload.status.as_str())
            .bind(payload.test_cases_passed)
            .bind(&payload.stdout)
            .bind(payload.runtime)
            .bind(payload.memory_usage)
            .bind(&payload.error_message)
            .bind(SubmissionStatus::Successful.as_str())
            .bind(SubmissionStatus::Error.as_str())
            .fetch_optional(&mut *tx)
            .await?;

        let application = match updated {
            Some(submission) => {
                let cleanup_enqueued = submission.status.is_terminal();
                if cleanup_enqueued {
                    let job = CleanupJob {
                        pod_name: id.to_string(),
                    };
                    insert_job(
                        &mut *tx,
                        CLEANUP_QUEUE,
                        &job.payload(),
                        chrono::Utc::now() + cleanup_delay,
                        cleanup_policy,
                    )
                    .await?;
                }
                ResultApplication::Applied {
                    submission,
                    cleanup_enqueued,
                }
            }
            None => {
                let select = format!("SELECT {COLUMNS} FROM submissions WHERE id = $1");
                match sqlx::query_as::<_, Submission>(&select)
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await?
                {
                    Some(submission) => ResultApplication::AlreadyTerminal(submission),
                    None => ResultApplication::NotFound,
                }
            }
        };

        tx.commit().await?;
        Ok(application)
    }
}
