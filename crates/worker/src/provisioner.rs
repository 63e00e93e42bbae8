//! Submission-queue consumer: provisions one execution pod per
//! submission.
//!
//! Transitions `Queued -> Processing` once the pod exists. Creation is
//! idempotent across redeliveries: a 409 from the cluster means an
//! earlier delivery already created the pod, and a submission past
//! `Queued` is left alone. When the final delivery still cannot create
//! a pod, the submission itself is marked `Error`; earlier failures
//! leave it `Queued` so a retry can pick it up.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use verdict_core::messages::{SubmissionJob, SUBMISSION_QUEUE};
use verdict_core::outcome::JobOutcome;
use verdict_core::status::SubmissionStatus;
use verdict_core::types::SubmissionId;
use verdict_db::models::queue_job::QueueJob;
use verdict_db::repositories::SubmissionRepo;
use verdict_kube::client::{KubeError, Orchestrator};
use verdict_kube::manifest::{self, ManifestParams};

use crate::config::WorkerConfig;

/// Error message stored on a submission when provisioning definitively
/// fails. Part of the user-visible API surface.
pub const PROVISIONING_FAILED_MESSAGE: &str = "Failed to create execution environment.";

/// Handles submission jobs by creating execution pods.
pub struct SubmissionProcessor {
    pool: PgPool,
    orchestrator: Arc<dyn Orchestrator>,
    config: WorkerConfig,
}

impl SubmissionProcessor {
    pub fn new(pool: PgPool, orchestrator: Arc<dyn Orchestrator>, config: WorkerConfig) -> Self {
        Self {
            pool,
            orchestrator,
            config,
        }
    }

    async fn provision(&self, job: &QueueJob, submission_id: SubmissionId) -> JobOutcome {
        let submission = match SubmissionRepo::find_for_execution(&self.pool, submission_id).await {
            Ok(Some(submission)) => submission,
            Ok(None) => {
                return JobOutcome::retry(format!("Submission {submission_id} not found"));
            }
            Err(e) => {
                return JobOutcome::retry(format!("Failed to load submission {submission_id}: {e}"));
            }
        };

        // Redelivery for a submission that already has its pod (or is done).
        if submission.status != SubmissionStatus::Queued {
            tracing::info!(
                submission_id = %submission_id,
                status = %submission.status,
                "Submission already past provisioning, skipping",
            );
            return JobOutcome::Success;
        }

        let pod_name = submission_id.to_string();
        let image = manifest::image_reference(
            &self.config.container_registry_url,
            &self.config.image_name_prefix,
            &submission.language_extension,
            &self.config.image_tag,
        );
        let callback_url = manifest::callback_url(&self.config.api_base_url, submission_id);
        let pod_manifest = match manifest::render_pod_manifest(&ManifestParams {
            pod_name: &pod_name,
            image: &image,
            callback_url: &callback_url,
            problem_id: submission.problem_id,
            test_cases_repo_url: &self.config.test_cases_repo_url,
        }) {
            Ok(m) => m,
            Err(e) => return JobOutcome::from(e),
        };

        tracing::info!(submission_id = %submission_id, image = %image, "Creating execution pod");
        match self.orchestrator.create_pod(&pod_manifest).await {
            Ok(()) => {}
            Err(err) if err.is_conflict() => {
                tracing::info!(submission_id = %submission_id, "Execution pod already exists");
            }
            Err(err) => return self.creation_failed(job, submission_id, err).await,
        }

        match SubmissionRepo::mark_processing(&self.pool, submission_id).await {
            Ok(true) => {
                tracing::info!(submission_id = %submission_id, "Submission moved to Processing");
            }
            Ok(false) => {
                tracing::debug!(
                    submission_id = %submission_id,
                    "Submission no longer in Queued, leaving status untouched",
                );
            }
            Err(e) => {
                // Pod exists; the redelivery will hit the 409 path and
                // take this transition again.
                return JobOutcome::retry(format!(
                    "Failed to mark submission {submission_id} processing: {e}"
                ));
            }
        }
        JobOutcome::Success
    }

    async fn creation_failed(
        &self,
        job: &QueueJob,
        submission_id: SubmissionId,
        err: KubeError,
    ) -> JobOutcome {
        tracing::error!(
            submission_id = %submission_id,
            attempt = job.attempts,
            error = %err,
            "Failed to create execution pod",
        );

        if job.is_final_attempt() {
            match SubmissionRepo::mark_provisioning_failed(
                &self.pool,
                submission_id,
                PROVISIONING_FAILED_MESSAGE,
            )
            .await
            {
                Ok(true) => {
                    tracing::warn!(
                        submission_id = %submission_id,
                        "Submission marked Error after final provisioning attempt",
                    );
                }
                Ok(false) => {
                    tracing::debug!(
                        submission_id = %submission_id,
                        "Submission no longer in Queued, not marking Error",
                    );
                }
                Err(e) => {
                    tracing::error!(
                        submission_id = %submission_id,
                        error = %e,
                        "Failed to record provisioning failure",
                    );
                }
            }
        }

        JobOutcome::retry(format!("Pod creation failed: {err}"))
    }
}

#[async_trait]
impl crate::runner::JobHandler for SubmissionProcessor {
    fn queue(&self) -> &'static str {
        SUBMISSION_QUEUE
    }

    async fn handle(&self, job: &QueueJob) -> JobOutcome {
        let message: SubmissionJob = match job.parse_payload() {
            Ok(message) => message,
            Err(e) => return JobOutcome::from(e),
        };
        self.provision(job, message.submission_id).await
    }
}
