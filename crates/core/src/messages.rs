//! Queue message and callback payload shapes.
//!
//! These are wire contracts shared with the execution harness, which is
//! not written in Rust: field names stay camelCase and must not drift.

use serde::{Deserialize, Serialize};

use crate::status::SubmissionStatus;
use crate::types::SubmissionId;

/// Queue name for submission-provisioning jobs.
pub const SUBMISSION_QUEUE: &str = "submission-queue";

/// Queue name for delayed execution-unit cleanup jobs.
pub const CLEANUP_QUEUE: &str = "cleanup-queue";

/// Message on [`SUBMISSION_QUEUE`]: provision an execution unit for one
/// submission. Produced exactly once, atomically with the submission row;
/// consumers must tolerate redelivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionJob {
    pub submission_id: SubmissionId,
}

impl SubmissionJob {
    /// The JSON value stored as the queue payload. Infallible by
    /// construction; a test pins it to the serde shape above.
    pub fn payload(&self) -> serde_json::Value {
        serde_json::json!({ "submissionId": self.submission_id })
    }
}

/// Message on [`CLEANUP_QUEUE`]: delete the named execution unit. The pod
/// name equals the submission id. Scheduling delay and retry policy are
/// queue metadata, not part of the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupJob {
    pub pod_name: String,
}

impl CleanupJob {
    /// The JSON value stored as the queue payload.
    pub fn payload(&self) -> serde_json::Value {
        serde_json::json!({ "podName": self.pod_name })
    }
}

/// Result callback body posted by the grading harness when a run
/// finishes.
///
/// Unknown `status` strings fail deserialization, which is how invalid
/// input gets rejected before any state is touched. Extra fields are
/// ignored so the harness can evolve independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPayload {
    pub test_cases_passed: i32,
    pub stdout: String,
    pub status: SubmissionStatus,
    pub runtime: f64,
    pub memory_usage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}
