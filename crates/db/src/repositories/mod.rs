//! Repository layer: one struct of static async methods per table.

pub mod language_repo;
pub mod problem_repo;
pub mod queue_repo;
pub mod submission_repo;
pub mod user_repo;

pub use language_repo::LanguageRepo;
pub use problem_repo::ProblemRepo;
pub use queue_repo::{QueueRepo, RetryDisposition};
pub use submission_repo::{ResultApplication, SubmissionRepo};
pub use user_repo::UserRepo;
