//! In-memory [`Orchestrator`] for tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::client::{KubeError, Orchestrator};

/// Test double that records every call and answers from scripted
/// failures. Each operation consumes its failure queue front to back,
/// then succeeds; an empty queue means the operation always succeeds.
#[derive(Default)]
pub struct StubOrchestrator {
    namespaces: Mutex<Vec<String>>,
    created_pods: Mutex<Vec<serde_json::Value>>,
    deleted_pods: Mutex<Vec<String>>,
    read_namespace_failures: Mutex<VecDeque<u16>>,
    create_namespace_failures: Mutex<VecDeque<u16>>,
    create_pod_failures: Mutex<VecDeque<u16>>,
    delete_pod_failures: Mutex<VecDeque<u16>>,
}

impl StubOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stub whose cluster already has the given namespace.
    pub async fn with_namespace(name: &str) -> Self {
        let stub = Self::new();
        stub.namespaces.lock().await.push(name.to_string());
        stub
    }

    /// Script the next `read_namespace` call to fail with `status`.
    pub async fn fail_read_namespace(&self, status: u16) {
        self.read_namespace_failures.lock().await.push_back(status);
    }

    /// Script the next `create_namespace` call to fail with `status`.
    pub async fn fail_create_namespace(&self, status: u16) {
        self.create_namespace_failures.lock().await.push_back(status);
    }

    /// Script the next `create_pod` call to fail with `status`.
    pub async fn fail_create_pod(&self, status: u16) {
        self.create_pod_failures.lock().await.push_back(status);
    }

    /// Script the next `delete_pod` call to fail with `status`.
    pub async fn fail_delete_pod(&self, status: u16) {
        self.delete_pod_failures.lock().await.push_back(status);
    }

    /// Namespaces created through the stub, in call order.
    pub async fn namespaces(&self) -> Vec<String> {
        self.namespaces.lock().await.clone()
    }

    /// Manifests passed to `create_pod`, in call order.
    pub async fn created_pods(&self) -> Vec<serde_json::Value> {
        self.created_pods.lock().await.clone()
    }

    /// `metadata.name` of every created pod, in call order.
    pub async fn created_pod_names(&self) -> Vec<String> {
        self.created_pods()
            .await
            .iter()
            .filter_map(|m| m.pointer("/metadata/name").and_then(|v| v.as_str()))
            .map(String::from)
            .collect()
    }

    /// Names passed to `delete_pod`, in call order.
    pub async fn deleted_pods(&self) -> Vec<String> {
        self.deleted_pods.lock().await.clone()
    }

    fn api_error(status: u16) -> KubeError {
        KubeError::Api {
            status,
            body: format!("stubbed {status} response"),
        }
    }

    async fn next_failure(queue: &Mutex<VecDeque<u16>>) -> Option<KubeError> {
        queue.lock().await.pop_front().map(Self::api_error)
    }
}

#[async_trait]
impl Orchestrator for StubOrchestrator {
    async fn read_namespace(&self, name: &str) -> Result<(), KubeError> {
        if let Some(err) = Self::next_failure(&self.read_namespace_failures).await {
            return Err(err);
        }
        if self.namespaces.lock().await.iter().any(|n| n == name) {
            Ok(())
        } else {
            Err(Self::api_error(404))
        }
    }

    async fn create_namespace(&self, name: &str) -> Result<(), KubeError> {
        if let Some(err) = Self::next_failure(&self.create_namespace_failures).await {
            return Err(err);
        }
        let mut namespaces = self.namespaces.lock().await;
        if namespaces.iter().any(|n| n == name) {
            return Err(Self::api_error(409));
        }
        namespaces.push(name.to_string());
        Ok(())
    }

    async fn create_pod(&self, manifest: &serde_json::Value) -> Result<(), KubeError> {
        if let Some(err) = Self::next_failure(&self.create_pod_failures).await {
            return Err(err);
        }
        self.created_pods.lock().await.push(manifest.clone());
        Ok(())
    }

    async fn delete_pod(&self, name: &str) -> Result<(), KubeError> {
        if let Some(err) = Self::next_failure(&self.delete_pod_failures).await {
            return Err(err);
        }
        self.deleted_pods.lock().await.push(name.to_string());
        Ok(())
    }
}
