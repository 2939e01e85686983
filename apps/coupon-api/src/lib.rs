//! # Coupon API
//!
//! HTTP service exposing the Coupon Store to the browser client.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Coupon API Service                              │
//! │                                                                         │
//! │  Browser ───► axum Router ───► CouponStore ───► SQLite                 │
//! │               (routes/)        (coupon-db)                              │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │            {status, data | message, errors}                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config::ApiConfig`]. Environment variables:
//! - `COUPON_CONFIG` - path to the TOML config file
//! - `COUPON_BIND_ADDR` / `COUPON_PORT` - listener (default: 0.0.0.0:8000)
//! - `COUPON_DB_PATH` - SQLite file (default: coupons.db)
//! - `COUPON_DB_MAX_CONNECTIONS` - pool size (default: 5)
//! - `COUPON_CORS_ORIGINS` - comma-separated allowed origins (default: *)

pub mod config;
pub mod error;
pub mod response;
pub mod routes;

use std::sync::Arc;

use coupon_db::{CouponStore, Database};

// Re-exports
pub use config::ApiConfig;
pub use error::ApiError;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<CouponStore>,

    /// Present when the store is SQLite-backed; used by `/health`.
    pub db: Option<Database>,
}

impl AppState {
    /// State over an arbitrary store (no database health check).
    pub fn new(store: CouponStore) -> Self {
        AppState {
            store: Arc::new(store),
            db: None,
        }
    }

    /// State over the SQLite-backed store of `db`.
    pub fn with_database(db: Database) -> Self {
        AppState {
            store: Arc::new(db.store()),
            db: Some(db),
        }
    }
}
