//! Shared domain types for the submission execution pipeline.
//!
//! Everything here is pure: status state machine, queue message shapes,
//! retry policy math, and the error taxonomy. No I/O, no database — the
//! `db`, `kube`, `api`, and `worker` crates all build on this one.

pub mod error;
pub mod messages;
pub mod outcome;
pub mod retry;
pub mod status;
pub mod types;
