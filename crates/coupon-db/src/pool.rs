//! # Database Handle
//!
//! Opens the SQLite file behind the Coupon Store.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Opening coupons.db                              │
//! │                                                                         │
//! │  DbConfig { path, max_connections }                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new ── WAL, synchronous=NORMAL, create if missing           │
//! │       │                                                                 │
//! │       ├── run_migrations (always)                                      │
//! │       ▼                                                                 │
//! │  db.store()   ──► CouponStore over SqliteCouponRepository              │
//! │  db.health()  ──► SELECT 1 + migration status, for GET /health         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::migrations::{self, MigrationStatus};
use crate::repository::coupon::SqliteCouponRepository;
use crate::store::CouponStore;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);
const MEMORY: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Where the coupons live and how many connections may reach them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// SQLite file, or `:memory:`.
    pub database_path: PathBuf,

    /// Pool ceiling. Default: 5
    pub max_connections: u32,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// A private in-memory database (for tests).
    ///
    /// Held on a single connection: a second one would open a different,
    /// empty database.
    pub fn in_memory() -> Self {
        DbConfig::new(MEMORY).max_connections(1)
    }

    fn is_memory(&self) -> bool {
        self.database_path.as_os_str() == MEMORY
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        let options = if self.is_memory() {
            SqliteConnectOptions::new().in_memory(true)
        } else {
            SqliteConnectOptions::new()
                .filename(&self.database_path)
                .create_if_missing(true)
        };
        options
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
    }
}

// =============================================================================
// Database
// =============================================================================

/// Result of a database health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbHealth {
    pub migrations: MigrationStatus,
}

impl DbHealth {
    pub fn is_healthy(&self) -> bool {
        self.migrations.is_current()
    }
}

/// Open SQLite pool with the coupon schema applied.
///
/// Clones share the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if needed) the database and applies migrations.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            max_connections = config.max_connections,
            "Opening coupon database"
        );

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT);
        if config.is_memory() {
            // Dropping the last connection discards the database.
            pool_options = pool_options.min_connections(1).idle_timeout(None).max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(config.connect_options())
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        migrations::run_migrations(&pool).await?;
        Ok(Database { pool })
    }

    /// Raw repository (no validation, no write lock).
    pub fn coupons(&self) -> SqliteCouponRepository {
        SqliteCouponRepository::new(self.pool.clone())
    }

    /// A Coupon Store over this database.
    ///
    /// Make one per process and share it; the write lock lives in the store.
    pub fn store(&self) -> CouponStore {
        CouponStore::new(Arc::new(self.coupons()))
    }

    /// Answers a query and reports migration state.
    pub async fn health(&self) -> DbResult<DbHealth> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        let migrations = migrations::migration_status(&self.pool).await?;
        Ok(DbHealth { migrations })
    }

    /// Closes the pool. Later queries fail.
    pub async fn close(&self) {
        info!("Closing coupon database");
        self.pool.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
