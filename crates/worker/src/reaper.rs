//! Cleanup-queue consumer: deletes finished execution pods.
//!
//! Deletion is best-effort. A pod that is already gone (404) counts as
//! success, since pods carry a TTL backstop and may self-terminate
//! first. Anything else is retried with backoff; once retries run out
//! the pod is abandoned to its TTL.

use std::sync::Arc;

use async_trait::async_trait;
use verdict_core::messages::{CleanupJob, CLEANUP_QUEUE};
use verdict_core::outcome::JobOutcome;
use verdict_db::models::queue_job::QueueJob;
use verdict_kube::client::Orchestrator;

use crate::runner::JobHandler;

/// Handles cleanup jobs by deleting execution pods.
pub struct CleanupProcessor {
    orchestrator: Arc<dyn Orchestrator>,
}

impl CleanupProcessor {
    pub fn new(orchestrator: Arc<dyn Orchestrator>) -> Self {
        Self { orchestrator }
    }
}

#[async_trait]
impl JobHandler for CleanupProcessor {
    fn queue(&self) -> &'static str {
        CLEANUP_QUEUE
    }

    async fn handle(&self, job: &QueueJob) -> JobOutcome {
        let message: CleanupJob = match job.parse_payload() {
            Ok(message) => message,
            Err(e) => return JobOutcome::from(e),
        };

        match self.orchestrator.delete_pod(&message.pod_name).await {
            Ok(()) => {
                tracing::info!(pod = %message.pod_name, "Execution pod deleted");
                JobOutcome::Success
            }
            Err(err) if err.is_not_found() => {
                tracing::info!(pod = %message.pod_name, "Execution pod already gone");
                JobOutcome::Success
            }
            Err(err) => {
                tracing::warn!(pod = %message.pod_name, error = %err, "Failed to delete execution pod");
                JobOutcome::retry(format!("Pod deletion failed: {err}"))
            }
        }
    }
}
