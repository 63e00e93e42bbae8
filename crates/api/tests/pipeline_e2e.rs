//! End-to-end pipeline tests: HTTP intake, provisioning, result callback,
//! and cleanup, driven deterministically against a stubbed cluster.
//!
//! The queue is stepped by hand (claim + process) instead of running the
//! poll loops, so each assertion observes one exact pipeline state.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_json, get_auth, patch_json, post_json_auth};
use sqlx::PgPool;
use uuid::Uuid;
use verdict_core::messages::{CLEANUP_QUEUE, SUBMISSION_QUEUE};
use verdict_db::models::queue_job::{QueueJob, QueueJobStatus};
use verdict_db::repositories::QueueRepo;
use verdict_kube::client::Orchestrator;
use verdict_kube::stub::StubOrchestrator;
use verdict_worker::config::WorkerConfig;
use verdict_worker::provisioner::{SubmissionProcessor, PROVISIONING_FAILED_MESSAGE};
use verdict_worker::reaper::CleanupProcessor;
use verdict_worker::runner::process_job;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn worker_config() -> WorkerConfig {
    WorkerConfig {
        database_url: "unused".to_string(),
        container_registry_url: "registry.example.com".to_string(),
        image_name_prefix: "verdict-runner".to_string(),
        image_tag: "v3".to_string(),
        api_base_url: "http://api.internal:3000".to_string(),
        test_cases_repo_url: "https://github.com/example/test-cases.git".to_string(),
        concurrency: 10,
        poll_interval_ms: 1000,
        stale_claim_secs: 300,
    }
}

/// Create a user, a problem, and a submission over HTTP. Returns the
/// caller's token and the submission id.
async fn accepted_submission(pool: &PgPool) -> (String, Uuid) {
    let (token, _) = common::register_user(pool, "ada").await;
    let problem_id = common::create_problem(pool, &token, "two-sum").await;
    let language_id = common::language_id_by_extension(pool, "py").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/submissions",
        serde_json::json!({
            "problem_id": problem_id,
            "language_id": language_id,
            "source_code": "print(sum(map(int, input().split())))",
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "Queued");

    let id = Uuid::parse_str(json["data"]["id"].as_str().unwrap()).unwrap();
    (token, id)
}

/// Fetch a submission over HTTP and return its JSON `data` object.
async fn fetch_submission(pool: &PgPool, token: &str, id: Uuid) -> serde_json::Value {
    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("/api/v1/submissions/{id}"), token).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"].clone()
}

/// Make every job on the queue immediately claimable.
async fn rewind_run_at(pool: &PgPool, queue: &str) {
    sqlx::query("UPDATE queue_jobs SET run_at = NOW() WHERE queue = $1")
        .bind(queue)
        .execute(pool)
        .await
        .unwrap();
}

/// Claim the next job on a queue, asserting one is claimable.
async fn claim(pool: &PgPool, queue: &str) -> QueueJob {
    QueueRepo::claim_next(pool, queue)
        .await
        .unwrap()
        .unwrap_or_else(|| panic!("expected a claimable job on {queue}"))
}

async fn job_status_id(pool: &PgPool, id: i64) -> i16 {
    QueueRepo::find_by_id(pool, id).await.unwrap().unwrap().status_id
}

// ---------------------------------------------------------------------------
// Happy path
// ---------------------------------------------------------------------------

/// Full lifecycle: accepted -> provisioned -> result recorded -> cleaned up.
#[sqlx::test(migrations = "../db/migrations")]
async fn submission_flows_from_intake_to_cleanup(pool: PgPool) {
    let (token, id) = accepted_submission(&pool).await;

    let stub = Arc::new(StubOrchestrator::new());
    let orchestrator: Arc<dyn Orchestrator> = stub.clone();

    // Step the provisioner once.
    let provisioner = SubmissionProcessor::new(pool.clone(), orchestrator.clone(), worker_config());
    let job = claim(&pool, SUBMISSION_QUEUE).await;
    process_job(&pool, &provisioner, &job).await;

    assert_eq!(job_status_id(&pool, job.id).await, QueueJobStatus::Completed.id());
    assert_eq!(stub.created_pod_names().await, vec![id.to_string()]);

    // The rendered manifest carries the language-selected image and the
    // callback URL for this submission.
    let pod = &stub.created_pods().await[0];
    assert_eq!(
        pod.pointer("/spec/containers/0/image").unwrap(),
        "registry.example.com/verdict-runner-py:v3"
    );
    let env = pod.pointer("/spec/containers/0/env").unwrap().clone();
    let callback = env
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["name"] == "CALLBACK_URL")
        .unwrap();
    assert_eq!(
        callback["value"],
        format!("http://api.internal:3000/api/v1/submissions/{id}/result")
    );

    assert_eq!(fetch_submission(&pool, &token, id).await["status"], "Processing");

    // The harness calls back with a terminal result.
    let app = common::build_test_app(pool.clone());
    let response = patch_json(
        app,
        &format!("/api/v1/submissions/{id}/result"),
        serde_json::json!({
            "testCasesPassed": 10,
            "stdout": "10/10 passed\n",
            "status": "Successful",
            "runtime": 812.0,
            "memoryUsage": 4096.0,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let submission = fetch_submission(&pool, &token, id).await;
    assert_eq!(submission["status"], "Successful");
    assert_eq!(submission["test_cases_passed"], 10);

    // Cleanup is scheduled but held by the grace delay.
    assert_eq!(QueueRepo::pending_count(&pool, CLEANUP_QUEUE).await.unwrap(), 0);
    rewind_run_at(&pool, CLEANUP_QUEUE).await;

    // Step the reaper once.
    let reaper = CleanupProcessor::new(orchestrator);
    let job = claim(&pool, CLEANUP_QUEUE).await;
    process_job(&pool, &reaper, &job).await;

    assert_eq!(job_status_id(&pool, job.id).await, QueueJobStatus::Completed.id());
    assert_eq!(stub.deleted_pods().await, vec![id.to_string()]);

    // The row itself is never deleted.
    assert_eq!(fetch_submission(&pool, &token, id).await["status"], "Successful");
}

// ---------------------------------------------------------------------------
// Persistent provisioning failure
// ---------------------------------------------------------------------------

/// When the cluster rejects pod creation on every delivery, the queue
/// retries up to the policy's attempts, dead-letters the job, and the
/// submission surfaces as a terminal Error with a diagnostic.
#[sqlx::test(migrations = "../db/migrations")]
async fn persistent_provisioning_failure_dead_letters_and_marks_error(pool: PgPool) {
    let (token, id) = accepted_submission(&pool).await;

    let stub = Arc::new(StubOrchestrator::new());
    for _ in 0..3 {
        stub.fail_create_pod(500).await;
    }
    let orchestrator: Arc<dyn Orchestrator> = stub.clone();
    let provisioner = SubmissionProcessor::new(pool.clone(), orchestrator, worker_config());

    let mut last_job_id = 0;
    for _ in 0..3 {
        rewind_run_at(&pool, SUBMISSION_QUEUE).await;
        let job = claim(&pool, SUBMISSION_QUEUE).await;
        last_job_id = job.id;
        process_job(&pool, &provisioner, &job).await;
    }

    // Attempts are spent: the job is dead-lettered with the failure reason.
    let job = QueueRepo::find_by_id(&pool, last_job_id).await.unwrap().unwrap();
    assert_eq!(job.status_id, QueueJobStatus::Dead.id());
    assert_eq!(job.attempts, 3);
    assert!(job.last_error.unwrap().contains("Pod creation failed"));

    // No pod was ever created, and the submission reports the failure.
    assert!(stub.created_pods().await.is_empty());
    let submission = fetch_submission(&pool, &token, id).await;
    assert_eq!(submission["status"], "Error");
    assert_eq!(submission["error_message"], PROVISIONING_FAILED_MESSAGE);
}
