//! Problem entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use verdict_core::types::{DbId, Timestamp};

/// Full problem row from the `problems` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Problem {
    pub id: DbId,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new problem.
#[derive(Debug, Deserialize)]
pub struct CreateProblem {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub difficulty: Option<String>,
}
