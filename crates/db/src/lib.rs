//! Database layer: pool construction, migrations, models, and
//! repositories (including the Postgres-backed job queue).

pub mod models;
pub mod repositories;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Maximum connections per pool. The api and worker processes each hold
/// their own pool.
const MAX_CONNECTIONS: u32 = 10;

/// How long to wait for a free connection before erroring.
const ACQUIRE_TIMEOUT_SECS: u64 = 5;

/// Create a Postgres connection pool for the given database URL.
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(std::time::Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
        .connect(database_url)
        .await
}

/// Cheap connectivity probe used by startup checks and the health route.
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all embedded migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
