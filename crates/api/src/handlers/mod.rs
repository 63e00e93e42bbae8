//! HTTP handler implementations, grouped by resource.

pub mod auth;
pub mod language;
pub mod problem;
pub mod submission;
