//! Explicit job handler outcome.
//!
//! Handlers report success, retryable failure, or fatal failure as a
//! value; the queue runner maps that tag to complete, backoff-requeue, or
//! dead-letter. Retry is never signalled by error identity or panics.

use crate::error::CoreError;

/// What the queue runner should do with a finished job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// Job done; acknowledge and forget.
    Success,
    /// Job failed in a way a later delivery might recover from.
    Retry { reason: String },
    /// Job can never succeed; dead-letter it immediately.
    Fatal { reason: String },
}

impl JobOutcome {
    pub fn retry(reason: impl Into<String>) -> Self {
        JobOutcome::Retry {
            reason: reason.into(),
        }
    }

    pub fn fatal(reason: impl Into<String>) -> Self {
        JobOutcome::Fatal {
            reason: reason.into(),
        }
    }
}

/// Classify a domain error into a job outcome.
///
/// `NotFound`, `Provisioning`, and `Transient` are worth redelivering;
/// everything else will fail identically next time and is dead-lettered.
impl From<CoreError> for JobOutcome {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { .. }
            | CoreError::Provisioning(_)
            | CoreError::Transient(_) => JobOutcome::retry(err.to_string()),
            other => JobOutcome::fatal(other.to_string()),
        }
    }
}
