//! Pod manifest rendering.
//!
//! The manifest is an embedded JSON template with placeholder tokens
//! substituted textually, then parsed. Rendering is deterministic:
//! identical inputs always produce an identical manifest.

use verdict_core::error::CoreError;
use verdict_core::types::{DbId, SubmissionId};

/// Embedded pod description with placeholder tokens.
const POD_TEMPLATE: &str = include_str!("pod-template.json");

/// Pod names are DNS-1123 labels.
const MAX_POD_NAME_LEN: usize = 63;

/// Values substituted into the pod template.
#[derive(Debug, Clone)]
pub struct ManifestParams<'a> {
    /// Pod name; by convention the submission id.
    pub pod_name: &'a str,
    /// Fully qualified runtime image reference.
    pub image: &'a str,
    /// URL the execution harness reports its result to.
    pub callback_url: &'a str,
    /// Problem whose test cases the harness should run.
    pub problem_id: DbId,
    /// Source the harness fetches the test-case bundle from.
    pub test_cases_repo_url: &'a str,
}

/// Build the runtime image reference for a language.
///
/// The image name encodes the language by file extension, e.g.
/// `registry.example.com/verdict-runner-py:v3`.
pub fn image_reference(registry: &str, prefix: &str, extension: &str, tag: &str) -> String {
    format!("{registry}/{prefix}-{extension}:{tag}")
}

/// Build the result callback URL for a submission.
pub fn callback_url(api_base_url: &str, submission_id: SubmissionId) -> String {
    format!(
        "{}/api/v1/submissions/{submission_id}/result",
        api_base_url.trim_end_matches('/')
    )
}

/// Check that a pod name is a valid DNS-1123 label: lowercase
/// alphanumerics and `-`, alphanumeric at both ends, at most 63 bytes.
pub fn validate_pod_name(name: &str) -> Result<(), CoreError> {
    let bytes = name.as_bytes();
    let edge = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    let valid = !bytes.is_empty()
        && bytes.len() <= MAX_POD_NAME_LEN
        && bytes.iter().all(|&b| edge(b) || b == b'-')
        && edge(bytes[0])
        && edge(bytes[bytes.len() - 1]);
    if valid {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("Invalid pod name {name:?}")))
    }
}

/// Render the pod manifest for one submission.
pub fn render_pod_manifest(params: &ManifestParams<'_>) -> Result<serde_json::Value, CoreError> {
    validate_pod_name(params.pod_name)?;
    let rendered = POD_TEMPLATE
        .replace("submission-id", params.pod_name)
        .replace("language-image", params.image)
        .replace("callback-url", params.callback_url)
        .replace("problem-id", &params.problem_id.to_string())
        .replace("test-cases-repo", params.test_cases_repo_url);
    serde_json::from_str(&rendered).map_err(|e| {
        CoreError::Internal(format!("Rendered pod manifest is not valid JSON: {e}"))
    })
}
