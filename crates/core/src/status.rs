//! Submission status state machine.
//!
//! One shared definition for every producer and consumer: the database
//! column, the API responses, the queue handlers, and the result callback
//! posted by the execution harness all serialize these exact strings.
//! Matching is case-sensitive on purpose.

use crate::error::CoreError;

/// Lifecycle status of a submission.
///
/// `Queued` means the intake layer accepted the submission and enqueued
/// its job. `Processing` means the orchestration platform confirmed
/// creation of the execution unit. `Successful` and `Error` are terminal:
/// once reached they are never revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SubmissionStatus {
    Queued,
    Processing,
    Successful,
    Error,
}

/// The terminal statuses, in no particular order.
pub const TERMINAL_STATUSES: [SubmissionStatus; 2] =
    [SubmissionStatus::Successful, SubmissionStatus::Error];

impl SubmissionStatus {
    /// The exact wire/storage string for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionStatus::Queued => "Queued",
            SubmissionStatus::Processing => "Processing",
            SubmissionStatus::Successful => "Successful",
            SubmissionStatus::Error => "Error",
        }
    }

    /// Whether this status admits no further result updates.
    pub fn is_terminal(self) -> bool {
        matches!(self, SubmissionStatus::Successful | SubmissionStatus::Error)
    }

    /// Whether the state machine permits moving from `self` to `next`.
    ///
    /// Edges:
    /// - `Queued -> Processing` (unit creation confirmed)
    /// - `Queued -> Error` (provisioning definitively failed)
    /// - `Processing -> Successful | Error` (result recorded)
    ///
    /// Terminal states have no outgoing edges. Self-transitions are not
    /// edges; idempotent re-application is handled by callers treating
    /// them as no-ops.
    pub fn can_transition_to(self, next: SubmissionStatus) -> bool {
        use SubmissionStatus::*;
        matches!(
            (self, next),
            (Queued, Processing) | (Queued, Error) | (Processing, Successful) | (Processing, Error)
        )
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubmissionStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Queued" => Ok(SubmissionStatus::Queued),
            "Processing" => Ok(SubmissionStatus::Processing),
            "Successful" => Ok(SubmissionStatus::Successful),
            "Error" => Ok(SubmissionStatus::Error),
            other => Err(CoreError::Validation(format!(
                "Unknown submission status: {other:?}"
            ))),
        }
    }
}

/// Conversion used by the database layer to decode TEXT columns.
impl TryFrom<String> for SubmissionStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, CoreError> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_strings_are_exact() {
        assert_eq!(
            serde_json::to_string(&SubmissionStatus::Queued).unwrap(),
            "\"Queued\""
        );
        assert_eq!(
            serde_json::to_string(&SubmissionStatus::Processing).unwrap(),
            "\"Processing\""
        );
        assert_eq!(
            serde_json::to_string(&SubmissionStatus::Successful).unwrap(),
            "\"Successful\""
        );
        assert_eq!(
            serde_json::to_string(&SubmissionStatus::Error).unwrap(),
            "\"Error\""
        );
    }

    #[test]
    fn deserialization_is_case_sensitive() {
        assert!(serde_json::from_str::<SubmissionStatus>("\"Successful\"").is_ok());
        assert!(serde_json::from_str::<SubmissionStatus>("\"successful\"").is_err());
        assert!(serde_json::from_str::<SubmissionStatus>("\"SUCCESSFUL\"").is_err());
        assert!(serde_json::from_str::<SubmissionStatus>("\"Done\"").is_err());
    }

    #[test]
    fn parse_round_trips_every_status() {
        for status in [
            SubmissionStatus::Queued,
            SubmissionStatus::Processing,
            SubmissionStatus::Successful,
            SubmissionStatus::Error,
        ] {
            assert_eq!(status.as_str().parse::<SubmissionStatus>().unwrap(), status);
        }
    }

    #[test]
    fn parse_rejects_unknown_values() {
        assert!("Running".parse::<SubmissionStatus>().is_err());
        assert!("".parse::<SubmissionStatus>().is_err());
        assert!(" Queued".parse::<SubmissionStatus>().is_err());
    }

    #[test]
    fn terminal_statuses() {
        assert!(!SubmissionStatus::Queued.is_terminal());
        assert!(!SubmissionStatus::Processing.is_terminal());
        assert!(SubmissionStatus::Successful.is_terminal());
        assert!(SubmissionStatus::Error.is_terminal());
        for status in TERMINAL_STATUSES {
            assert!(status.is_terminal());
        }
    }

    #[test]
    fn transition_table_is_exhaustive() {
        use SubmissionStatus::*;
        let all = [Queued, Processing, Successful, Error];
        let allowed = [
            (Queued, Processing),
            (Queued, Error),
            (Processing, Successful),
            (Processing, Error),
        ];
        for from in all {
            for to in all {
                assert_eq!(
                    from.can_transition_to(to),
                    allowed.contains(&(from, to)),
                    "unexpected verdict for {from:?} -> {to:?}"
                );
            }
        }
    }

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        use SubmissionStatus::*;
        for from in TERMINAL_STATUSES {
            for to in [Queued, Processing, Successful, Error] {
                assert!(!from.can_transition_to(to));
            }
        }
    }
}
