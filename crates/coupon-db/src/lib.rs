//! # coupon-db: Database Layer and Coupon Store
//!
//! This crate owns the authoritative coupon collection. It uses SQLite for
//! storage with sqlx for async operations, and wraps every backend in a
//! [`CouponStore`] that enforces the write-time invariants.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Coupon Manager Data Flow                           │
//! │                                                                         │
//! │  HTTP handler (POST /coupons)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     coupon-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │  CouponStore  │    │ CouponBackend  │    │  Migrations  │  │   │
//! │  │   │  (store.rs)   │───►│  (backend.rs)  │    │  (embedded)  │  │   │
//! │  │   │               │    │                │    │              │  │   │
//! │  │   │ validate +    │    │ SqliteCoupon-  │    │ 001_create_  │  │   │
//! │  │   │ write under   │    │ Repository     │    │ coupons.sql  │  │   │
//! │  │   │ one lock      │    │ MemoryCoupon-  │    │              │  │   │
//! │  │   │               │    │ Backend        │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (coupons.db)                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and store error types
//! - [`backend`] - Persistence backend trait + in-memory backend
//! - [`repository`] - SQLite repository
//! - [`store`] - The Coupon Store
//!
//! ## Usage
//!
//! ```rust,ignore
//! use coupon_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("coupons.db")).await?;
//! let store = db.store();
//!
//! let coupons = store.list().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backend;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use backend::{CouponBackend, MemoryCouponBackend};
pub use error::{DbError, DbResult, StoreError, StoreResult};
pub use migrations::MigrationStatus;
pub use pool::{Database, DbConfig, DbHealth};
pub use repository::coupon::SqliteCouponRepository;
pub use store::CouponStore;
