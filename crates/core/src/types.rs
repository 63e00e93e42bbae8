/// All database primary keys except submissions are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Submissions are keyed by UUID so the id can double as the
/// execution unit name on the orchestration platform.
pub type SubmissionId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
