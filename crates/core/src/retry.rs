//! Queue retry policies and backoff math.

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Grace delay between a submission reaching a terminal status and its
/// cleanup job becoming claimable, in milliseconds. Gives the execution
/// unit time to flush logs and exit on its own.
pub const CLEANUP_GRACE_DELAY_MS: i64 = 5000;

/// Retry policy for submission-provisioning jobs.
pub const SUBMISSION_RETRY_POLICY: RetryPolicy = RetryPolicy::new(3, 1000);

/// Retry policy for execution-unit cleanup jobs.
pub const CLEANUP_RETRY_POLICY: RetryPolicy = RetryPolicy::new(3, 2000);

/// Exponent cap so backoff math cannot overflow on absurd attempt counts.
const MAX_BACKOFF_EXPONENT: u32 = 20;

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Bounded-retry policy with exponential backoff.
///
/// `attempt` is 1-based and counts deliveries: the first delivery is
/// attempt 1, so a policy with `max_attempts = 3` allows two redeliveries
/// before the job is dead-lettered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: i32,
    pub backoff_base_ms: i64,
}

impl RetryPolicy {
    pub const fn new(max_attempts: i32, backoff_base_ms: i64) -> Self {
        Self {
            max_attempts,
            backoff_base_ms,
        }
    }

    /// Delay before redelivering a job whose `attempt`-th delivery failed:
    /// `base * 2^(attempt - 1)`.
    pub fn backoff_for_attempt(&self, attempt: i32) -> chrono::Duration {
        let exponent = attempt.saturating_sub(1).clamp(0, MAX_BACKOFF_EXPONENT as i32) as u32;
        let millis = self.backoff_base_ms.saturating_mul(1i64 << exponent);
        chrono::Duration::milliseconds(millis)
    }

    /// Whether a job that has been delivered `attempts` times has any
    /// deliveries left.
    pub fn attempts_remaining(&self, attempts: i32) -> bool {
        attempts < self.max_attempts
    }
}
