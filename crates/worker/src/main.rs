use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use verdict_kube::client::{KubeApi, Orchestrator};
use verdict_kube::config::KubeConfig;
use verdict_worker::config::WorkerConfig;
use verdict_worker::maintenance;
use verdict_worker::provisioner::SubmissionProcessor;
use verdict_worker::reaper::CleanupProcessor;
use verdict_worker::runner::QueueRunner;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "verdict_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = WorkerConfig::from_env();
    let kube_config = KubeConfig::from_env();
    tracing::info!(
        concurrency = config.concurrency,
        namespace = %kube_config.namespace,
        "Loaded worker configuration"
    );

    // --- Database ---
    let pool = verdict_db::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    verdict_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    // --- Kubernetes ---
    let orchestrator: Arc<dyn Orchestrator> =
        Arc::new(KubeApi::new(&kube_config).expect("Failed to build Kubernetes client"));
    verdict_kube::namespace::ensure_namespace(orchestrator.as_ref(), &kube_config.namespace)
        .await
        .expect("Failed to ensure execution namespace exists");

    // --- Queue runners ---
    let cancel = CancellationToken::new();
    let poll_interval = Duration::from_millis(config.poll_interval_ms);

    let provisioner =
        SubmissionProcessor::new(pool.clone(), Arc::clone(&orchestrator), config.clone());
    let submission_runner = QueueRunner::new(pool.clone(), Arc::new(provisioner), config.concurrency)
        .with_poll_interval(poll_interval);
    let submission_cancel = cancel.clone();
    let submission_handle = tokio::spawn(async move {
        submission_runner.run(submission_cancel).await;
    });

    let reaper = CleanupProcessor::new(Arc::clone(&orchestrator));
    let cleanup_runner = QueueRunner::new(pool.clone(), Arc::new(reaper), config.concurrency)
        .with_poll_interval(poll_interval);
    let cleanup_cancel = cancel.clone();
    let cleanup_handle = tokio::spawn(async move {
        cleanup_runner.run(cleanup_cancel).await;
    });

    // --- Stale-claim sweep ---
    let sweep_handle = tokio::spawn(maintenance::run(
        pool.clone(),
        config.stale_claim_secs,
        cancel.clone(),
    ));

    tracing::info!("Worker started");

    // --- Shutdown ---
    shutdown_signal().await;
    cancel.cancel();

    let tasks = [
        ("submission runner", submission_handle),
        ("cleanup runner", cleanup_handle),
        ("stale-claim sweep", sweep_handle),
    ];
    for (name, handle) in tasks {
        if tokio::time::timeout(Duration::from_secs(30), handle)
            .await
            .is_err()
        {
            tracing::warn!(task = name, "Task did not stop within the shutdown window");
        }
    }
    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the worker
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
