//! Repository for the `problems` table.

use sqlx::PgPool;
use verdict_core::types::DbId;

use crate::models::problem::{CreateProblem, Problem};

const COLUMNS: &str = "id, slug, title, description, difficulty, created_at, updated_at";

/// Provides CRUD operations for problems.
pub struct ProblemRepo;

impl ProblemRepo {
    /// Insert a new problem, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProblem) -> Result<Problem, sqlx::Error> {
        let query = format!(
            "INSERT INTO problems (slug, title, description, difficulty)
             VALUES ($1, $2, $3, COALESCE($4, 'medium'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Problem>(&query)
            .bind(&input.slug)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.difficulty)
            .fetch_one(pool)
            .await
    }

    /// Find a problem by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Problem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM problems WHERE id = $1");
        sqlx::query_as::<_, Problem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all problems, most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Problem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM problems ORDER BY created_at DESC");
        sqlx::query_as::<_, Problem>(&query).fetch_all(pool).await
    }
}
