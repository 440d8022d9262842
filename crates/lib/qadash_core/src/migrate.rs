//! Database migration support.
//!
//! Embeds and runs SQL migrations from `qadash_core/migrations/`.

use sqlx::PgPool;
use sqlx::migrate::Migrator;

/// Embedded migrations. Also handed to `#[sqlx::test]` so each test gets a
/// freshly migrated database.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run all embedded database migrations against the given pool.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}
