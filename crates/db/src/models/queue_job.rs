//! Queue job model and lifecycle status.

use sqlx::FromRow;
use verdict_core::error::CoreError;
use verdict_core::retry::RetryPolicy;
use verdict_core::types::{DbId, Timestamp};

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

/// Queue job lifecycle status.
///
/// Discriminants match the 1-based seed order of the
/// `queue_job_statuses` lookup table.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueJobStatus {
    /// Claimable once `run_at` has passed.
    Pending = 1,
    /// Claimed by a worker; returned to `Pending` by the stale sweep if
    /// the worker dies.
    Running = 2,
    /// Finished successfully.
    Completed = 3,
    /// Dead-lettered: retries exhausted or failure was fatal.
    Dead = 4,
}

impl QueueJobStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }
}

impl From<QueueJobStatus> for StatusId {
    fn from(value: QueueJobStatus) -> Self {
        value as StatusId
    }
}

/// Full job row from the `queue_jobs` table.
#[derive(Debug, Clone, FromRow)]
pub struct QueueJob {
    pub id: DbId,
    pub queue: String,
    pub payload: serde_json::Value,
    pub status_id: StatusId,
    /// Delivery count; incremented when the job is claimed.
    pub attempts: i32,
    pub max_attempts: i32,
    pub backoff_base_ms: i64,
    pub run_at: Timestamp,
    pub claimed_at: Option<Timestamp>,
    pub finished_at: Option<Timestamp>,
    pub last_error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl QueueJob {
    /// The retry policy this job was enqueued with.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.backoff_base_ms)
    }

    /// Whether this delivery is the job's last one.
    pub fn is_final_attempt(&self) -> bool {
        !self.retry_policy().attempts_remaining(self.attempts)
    }

    /// Deserialize the JSONB payload into a typed message.
    ///
    /// A malformed payload can never succeed on redelivery, so callers
    /// should treat the error as fatal for the job.
    pub fn parse_payload<T: serde::de::DeserializeOwned>(&self) -> Result<T, CoreError> {
        serde_json::from_value(self.payload.clone()).map_err(|e| {
            CoreError::Validation(format!("Malformed payload on queue {:?}: {e}", self.queue))
        })
    }
}
