//! Repository for the `languages` table.

use sqlx::PgPool;
use verdict_core::types::DbId;

use crate::models::language::{CreateLanguage, Language};

const COLUMNS: &str = "id, name, extension, created_at";

/// Provides CRUD operations for languages.
pub struct LanguageRepo;

impl LanguageRepo {
    /// Insert a new language, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateLanguage) -> Result<Language, sqlx::Error> {
        let query = format!(
            "INSERT INTO languages (name, extension)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Language>(&query)
            .bind(&input.name)
            .bind(&input.extension)
            .fetch_one(pool)
            .await
    }

    /// Find a language by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Language>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM languages WHERE id = $1");
        sqlx::query_as::<_, Language>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all languages ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Language>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM languages ORDER BY name ASC");
        sqlx::query_as::<_, Language>(&query).fetch_all(pool).await
    }
}
