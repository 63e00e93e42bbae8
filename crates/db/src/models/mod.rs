//! Row structs and DTOs, one module per table.

pub mod language;
pub mod problem;
pub mod queue_job;
pub mod submission;
pub mod user;
