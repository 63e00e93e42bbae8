//! Submission entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use verdict_core::status::SubmissionStatus;
use verdict_core::types::{DbId, SubmissionId, Timestamp};

/// Full submission row from the `submissions` table.
///
/// Safe to serialize as-is: the status field renders as the shared
/// contract string.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub problem_id: DbId,
    pub user_id: DbId,
    pub language_id: DbId,
    pub source_code: String,
    #[sqlx(try_from = "String")]
    pub status: SubmissionStatus,
    pub test_cases_passed: i32,
    pub stdout: String,
    pub runtime: f64,
    pub memory_usage: f64,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a submission. The id is generated at insert time.
#[derive(Debug, Clone)]
pub struct CreateSubmission {
    pub problem_id: DbId,
    pub user_id: DbId,
    pub language_id: DbId,
    pub source_code: String,
}

/// The slice of a submission the provisioner needs, with the language
/// extension already joined in.
#[derive(Debug, Clone, FromRow)]
pub struct SubmissionForExecution {
    pub id: SubmissionId,
    pub problem_id: DbId,
    #[sqlx(try_from = "String")]
    pub status: SubmissionStatus,
    pub language_extension: String,
}
