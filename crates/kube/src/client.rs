//! REST API client for the Kubernetes core API group.
//!
//! Wraps the handful of endpoints the pipeline needs (namespace
//! read/create, pod create/delete) using [`reqwest`].

use async_trait::async_trait;
use reqwest::Method;

use crate::config::KubeConfig;

/// Errors from the Kubernetes REST layer.
#[derive(Debug, thiserror::Error)]
pub enum KubeError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API server returned a non-2xx status code.
    #[error("Kubernetes API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl KubeError {
    /// The server rejected a create because the object already exists.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Api { status: 409, .. })
    }

    /// The named object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}

/// Cluster operations the pipeline programs against.
///
/// [`KubeApi`] is the production implementation;
/// [`crate::stub::StubOrchestrator`] replaces it in tests.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Check that a namespace exists.
    async fn read_namespace(&self, name: &str) -> Result<(), KubeError>;

    /// Create a namespace.
    async fn create_namespace(&self, name: &str) -> Result<(), KubeError>;

    /// Create a pod from a manifest in the configured namespace.
    async fn create_pod(&self, manifest: &serde_json::Value) -> Result<(), KubeError>;

    /// Delete a pod by name from the configured namespace.
    async fn delete_pod(&self, name: &str) -> Result<(), KubeError>;
}

/// HTTP client for a single Kubernetes API server.
pub struct KubeApi {
    client: reqwest::Client,
    api_url: String,
    namespace: String,
    token: Option<String>,
}

impl KubeApi {
    /// Create a new API client from cluster connection settings.
    pub fn new(config: &KubeConfig) -> Result<Self, KubeError> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;
        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            namespace: config.namespace.clone(),
            token: config.token.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, format!("{}{path}", self.api_url));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    // ---- private helpers ----

    /// Assert the response has a success status code, discarding the
    /// body. On failure, returns a [`KubeError::Api`] containing the
    /// status and body text.
    async fn check_status(response: reqwest::Response) -> Result<(), KubeError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(KubeError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Orchestrator for KubeApi {
    async fn read_namespace(&self, name: &str) -> Result<(), KubeError> {
        let response = self
            .request(Method::GET, &format!("/api/v1/namespaces/{name}"))
            .send()
            .await?;
        Self::check_status(response).await
    }

    async fn create_namespace(&self, name: &str) -> Result<(), KubeError> {
        let body = serde_json::json!({
            "apiVersion": "v1",
            "kind": "Namespace",
            "metadata": { "name": name },
        });
        let response = self
            .request(Method::POST, "/api/v1/namespaces")
            .json(&body)
            .send()
            .await?;
        Self::check_status(response).await
    }

    async fn create_pod(&self, manifest: &serde_json::Value) -> Result<(), KubeError> {
        let response = self
            .request(
                Method::POST,
                &format!("/api/v1/namespaces/{}/pods", self.namespace),
            )
            .json(manifest)
            .send()
            .await?;
        Self::check_status(response).await
    }

    async fn delete_pod(&self, name: &str) -> Result<(), KubeError> {
        let response = self
            .request(
                Method::DELETE,
                &format!("/api/v1/namespaces/{}/pods/{name}", self.namespace),
            )
            .send()
            .await?;
        Self::check_status(response).await
    }
}
