/// Namespace holding the execution pods unless overridden.
pub const DEFAULT_NAMESPACE: &str = "isolated-execution-env";

/// Cluster connection settings loaded from environment variables.
#[derive(Debug, Clone)]
pub struct KubeConfig {
    /// Base URL of the Kubernetes API server, e.g. `https://10.0.0.1:6443`.
    pub api_url: String,
    /// Bearer token for the service account, when the cluster requires one.
    pub token: Option<String>,
    /// Namespace the execution pods run in.
    pub namespace: String,
    /// Skip TLS certificate verification. Only for local clusters with
    /// self-signed certificates.
    pub accept_invalid_certs: bool,
}

impl KubeConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var             | Default                   |
    /// |---------------------|---------------------------|
    /// | `KUBE_API_URL`      | (required)                |
    /// | `KUBE_TOKEN`        | (none)                    |
    /// | `EXEC_NAMESPACE`    | `isolated-execution-env`  |
    /// | `KUBE_INSECURE_TLS` | `false`                   |
    pub fn from_env() -> Self {
        let api_url =
            std::env::var("KUBE_API_URL").expect("KUBE_API_URL must be set in the environment");
        assert!(!api_url.is_empty(), "KUBE_API_URL must not be empty");

        let token = std::env::var("KUBE_TOKEN").ok().filter(|t| !t.is_empty());

        let namespace =
            std::env::var("EXEC_NAMESPACE").unwrap_or_else(|_| DEFAULT_NAMESPACE.into());

        let accept_invalid_certs: bool = std::env::var("KUBE_INSECURE_TLS")
            .unwrap_or_else(|_| "false".into())
            .parse()
            .expect("KUBE_INSECURE_TLS must be `true` or `false`");

        Self {
            api_url,
            token,
            namespace,
            accept_invalid_certs,
        }
    }
}
