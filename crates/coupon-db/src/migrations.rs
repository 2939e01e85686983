//! # Schema Migrations
//!
//! The `coupons` schema ships inside the binary; `Database::new` brings any
//! database file up to date before the store sees it.
//!
//! ```text
//! migrations/sqlite/
//! └── 001_create_coupons.sql   coupons table, UNIQUE(code), created_at index
//!
//! _sqlx_migrations             one row per applied file
//! ```
//!
//! New schema changes go in a new numbered file. Applied files are never
//! edited.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// How far a database is behind the embedded schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Migrations embedded in this build.
    pub embedded: usize,
    /// Migrations recorded as applied in the database.
    pub applied: usize,
}

impl MigrationStatus {
    pub fn is_current(&self) -> bool {
        self.applied >= self.embedded
    }
}

/// Applies every pending migration. Idempotent.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;
    info!(embedded = MIGRATOR.migrations.len(), "Coupon schema up to date");
    Ok(())
}

/// Compares the applied migrations against the embedded ones.
///
/// Fails if the database cannot be queried.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<MigrationStatus> {
    let applied: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?;

    Ok(MigrationStatus {
        embedded: MIGRATOR.migrations.len(),
        applied: usize::try_from(applied).map_err(|e| DbError::Internal(e.to_string()))?,
    })
}
