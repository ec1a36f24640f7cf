//! Schema migrations embedded from the workspace `migrations/` directory.

use sqlx::migrate::Migrator;
use tracing::info;

use portal_core::error::{AppError, ErrorKind};
use portal_core::result::AppResult;

use crate::connection::DatabasePool;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Apply every pending migration. Returns the number of embedded migrations.
pub async fn run_migrations(db: &DatabasePool) -> AppResult<usize> {
    let embedded = MIGRATOR.iter().count();
    info!(embedded, "Applying schema migrations");

    MIGRATOR.run(db.pool()).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to run migrations: {e}"),
            e,
        )
    })?;

    info!("Schema is up to date");
    Ok(embedded)
}
