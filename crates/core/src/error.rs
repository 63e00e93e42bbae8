//! Domain error taxonomy shared across the workspace.

/// Domain-level error for the submission pipeline and its supporting
/// surface.
///
/// The pipeline-specific variants map onto how a job failure is handled:
/// `Configuration` aborts a process at startup, `NotFound`/`Provisioning`/
/// `Transient` surface as retryable job failures, and `Validation` rejects
/// input without mutating state.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An entity was not found by id.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Input failed validation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// An operation conflicts with existing state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Missing or unusable permissions.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Required configuration is missing or malformed. Fatal at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The orchestration platform rejected creation of an execution unit.
    #[error("Provisioning failed: {0}")]
    Provisioning(String),

    /// A recoverable infrastructure failure (network, throttling, DB
    /// unavailability). Safe to retry.
    #[error("Transient infrastructure error: {0}")]
    Transient(String),

    /// An unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a [`CoreError::NotFound`] with a displayable id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        CoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
