//! Schema migrations.

use sqlx::PgPool;
use tracing::info;

use revhub_core::error::{AppError, ErrorKind};
use revhub_core::result::AppResult;

/// Apply every pending migration under `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    info!("Applying RevHub migrations");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to run migrations: {e}"),
                e,
            )
        })?;

    info!("Migrations applied");
    Ok(())
}
