/// Default number of jobs a runner may process concurrently.
const DEFAULT_CONCURRENCY: usize = 10;

/// Default queue polling interval in milliseconds.
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Default age after which a claim counts as abandoned.
const DEFAULT_STALE_CLAIM_SECS: i64 = 300;

/// Worker configuration loaded from environment variables.
///
/// The image fields combine into the runtime image reference for a
/// submission's language; `api_base_url` is where execution pods report
/// their results back to.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Postgres connection string.
    pub database_url: String,
    /// Registry base the runtime images are pulled from.
    pub container_registry_url: String,
    /// Image name prefix, completed by the language extension.
    pub image_name_prefix: String,
    /// Release tag of the runtime images.
    pub image_tag: String,
    /// Public base URL of the API, used to build callback URLs.
    pub api_base_url: String,
    /// Source the execution harness fetches test-case bundles from.
    pub test_cases_repo_url: String,
    /// Jobs a runner may process concurrently (default: `10`).
    pub concurrency: usize,
    /// Queue polling interval in milliseconds (default: `1000`).
    pub poll_interval_ms: u64,
    /// Age in seconds after which a claim counts as abandoned
    /// (default: `300`).
    pub stale_claim_secs: i64,
}

impl WorkerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                  | Default    |
    /// |--------------------------|------------|
    /// | `DATABASE_URL`           | (required) |
    /// | `CONTAINER_REGISTRY_URL` | (required) |
    /// | `IMAGE_NAME_PREFIX`      | (required) |
    /// | `IMAGE_TAG`              | (required) |
    /// | `API_BASE_URL`           | (required) |
    /// | `TEST_CASES_REPO_URL`    | (required) |
    /// | `WORKER_CONCURRENCY`     | `10`       |
    /// | `POLL_INTERVAL_MS`       | `1000`     |
    /// | `STALE_CLAIM_SECS`       | `300`      |
    pub fn from_env() -> Self {
        let required = |name: &str| {
            let value = std::env::var(name)
                .unwrap_or_else(|_| panic!("{name} must be set in the environment"));
            assert!(!value.is_empty(), "{name} must not be empty");
            value
        };

        let concurrency: usize = std::env::var("WORKER_CONCURRENCY")
            .unwrap_or_else(|_| DEFAULT_CONCURRENCY.to_string())
            .parse()
            .expect("WORKER_CONCURRENCY must be a valid usize");
        assert!(concurrency > 0, "WORKER_CONCURRENCY must be at least 1");

        let poll_interval_ms: u64 = std::env::var("POLL_INTERVAL_MS")
            .unwrap_or_else(|_| DEFAULT_POLL_INTERVAL_MS.to_string())
            .parse()
            .expect("POLL_INTERVAL_MS must be a valid u64");

        let stale_claim_secs: i64 = std::env::var("STALE_CLAIM_SECS")
            .unwrap_or_else(|_| DEFAULT_STALE_CLAIM_SECS.to_string())
            .parse()
            .expect("STALE_CLAIM_SECS must be a valid i64");

        Self {
            database_url: required("DATABASE_URL"),
            container_registry_url: required("CONTAINER_REGISTRY_URL"),
            image_name_prefix: required("IMAGE_NAME_PREFIX"),
            image_tag: required("IMAGE_TAG"),
            api_base_url: required("API_BASE_URL"),
            test_cases_repo_url: required("TEST_CASES_REPO_URL"),
            concurrency,
            poll_interval_ms,
            stale_claim_secs,
        }
    }
}
