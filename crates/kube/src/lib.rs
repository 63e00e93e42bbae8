//! Kubernetes client for the isolated execution environment.
//!
//! Talks to the cluster over its REST API: namespace bootstrap, pod
//! creation from a rendered manifest, and pod deletion. The
//! [`client::Orchestrator`] trait is the seam the pipeline workers
//! program against; [`stub::StubOrchestrator`] stands in for a real
//! cluster in tests.

pub mod client;
pub mod config;
pub mod manifest;
pub mod namespace;
pub mod stub;
