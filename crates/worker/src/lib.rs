//! Background workers driving the submission pipeline.
//!
//! Two queue consumers share one generic runner: the pod provisioner
//! (submission queue) and the cleanup reaper (cleanup queue). A
//! periodic sweep returns job claims abandoned by crashed workers to
//! the pending state.

pub mod config;
pub mod maintenance;
pub mod provisioner;
pub mod reaper;
pub mod runner;
