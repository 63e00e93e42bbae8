//! Language entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use verdict_core::types::{DbId, Timestamp};

/// Full language row from the `languages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Language {
    pub id: DbId,
    pub name: String,
    /// File extension, doubling as the runtime-image discriminator.
    pub extension: String,
    pub created_at: Timestamp,
}

/// DTO for registering a new language.
#[derive(Debug, Deserialize)]
pub struct CreateLanguage {
    pub name: String,
    pub extension: String,
}
