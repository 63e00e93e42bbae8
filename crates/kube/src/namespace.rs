//! Execution-namespace bootstrap, run once at worker startup.

use tracing::info;

use crate::client::{KubeError, Orchestrator};

/// Ensure the execution namespace exists, creating it when missing.
///
/// Another worker may create the namespace between our read and create;
/// the create's 409 is treated as success.
pub async fn ensure_namespace(client: &dyn Orchestrator, name: &str) -> Result<(), KubeError> {
    match client.read_namespace(name).await {
        Ok(()) => {
            info!(namespace = %name, "Namespace already exists");
            Ok(())
        }
        Err(err) if err.is_not_found() => {
            info!(namespace = %name, "Namespace not found, creating");
            match client.create_namespace(name).await {
                Ok(()) => {
                    info!(namespace = %name, "Namespace created");
                    Ok(())
                }
                Err(err) if err.is_conflict() => Ok(()),
                Err(err) => Err(err),
            }
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::StubOrchestrator;

    #[tokio::test]
    async fn leaves_existing_namespace_alone() {
        let stub = StubOrchestrator::with_namespace("isolated-execution-env").await;
        ensure_namespace(&stub, "isolated-execution-env").await.unwrap();
        assert_eq!(stub.namespaces().await, vec!["isolated-execution-env"]);
    }

    #[tokio::test]
    async fn creates_missing_namespace() {
        let stub = StubOrchestrator::new();
        ensure_namespace(&stub, "isolated-execution-env").await.unwrap();
        assert_eq!(stub.namespaces().await, vec!["isolated-execution-env"]);
    }

    #[tokio::test]
    async fn lost_creation_race_counts_as_success() {
        let stub = StubOrchestrator::new();
        stub.fail_create_namespace(409).await;
        ensure_namespace(&stub, "isolated-execution-env").await.unwrap();
    }

    #[tokio::test]
    async fn propagates_unexpected_read_errors() {
        let stub = StubOrchestrator::new();
        stub.fail_read_namespace(500).await;
        let err = ensure_namespace(&stub, "isolated-execution-env")
            .await
            .unwrap_err();
        assert!(matches!(err, KubeError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn propagates_unexpected_create_errors() {
        let stub = StubOrchestrator::new();
        stub.fail_create_namespace(503).await;
        let err = ensure_namespace(&stub, "isolated-execution-env")
            .await
            .unwrap_err();
        assert!(matches!(err, KubeError::Api { status: 503, .. }));
    }
}
