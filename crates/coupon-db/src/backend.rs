//! # Persistence Backends
//!
//! The seam between the Coupon Store and whatever holds the records.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Backend Trait                                      │
//! │                                                                         │
//! │  CouponStore ──► Arc<dyn CouponBackend>                                │
//! │                        │                                                │
//! │            ┌───────────┴────────────┐                                   │
//! │            ▼                        ▼                                   │
//! │  SqliteCouponRepository     MemoryCouponBackend                        │
//! │  (repository/coupon.rs)     (this file, tests + demos)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Backends are dumb storage: they never validate. They must reject a
//! second record with an existing `code` with [`DbError::UniqueViolation`].

use async_trait::async_trait;
use coupon_core::Coupon;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Raw coupon persistence.
#[async_trait]
pub trait CouponBackend: Send + Sync {
    /// Every record, newest first.
    async fn list(&self) -> DbResult<Vec<Coupon>>;

    /// The record with this id, if any.
    async fn get(&self, id: &str) -> DbResult<Option<Coupon>>;

    /// The record holding this exact (case-sensitive) code, if any.
    async fn find_by_code(&self, code: &str) -> DbResult<Option<Coupon>>;

    /// Inserts a new record.
    async fn insert(&self, coupon: &Coupon) -> DbResult<()>;

    /// Overwrites the record with `coupon.id`.
    ///
    /// Returns `DbError::NotFound` if no such record exists.
    async fn update(&self, coupon: &Coupon) -> DbResult<()>;

    /// Removes the record. Returns whether one was removed.
    async fn delete(&self, id: &str) -> DbResult<bool>;
}

// =============================================================================
// In-Memory Backend
// =============================================================================

/// Backend holding records in process memory.
///
/// Records are kept in insertion order; `list` reverses it so ties on
/// `created_at` still come out newest first.
#[derive(Debug, Default)]
pub struct MemoryCouponBackend {
    coupons: RwLock<Vec<Coupon>>,
}

impl MemoryCouponBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.coupons.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.coupons.read().await.is_empty()
    }
}

#[async_trait]
impl CouponBackend for MemoryCouponBackend {
    async fn list(&self) -> DbResult<Vec<Coupon>> {
        let coupons = self.coupons.read().await;
        let mut listed: Vec<Coupon> = coupons.iter().rev().cloned().collect();
        // Stable sort keeps reverse-insertion order among equal timestamps.
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listed)
    }

    async fn get(&self, id: &str) -> DbResult<Option<Coupon>> {
        let coupons = self.coupons.read().await;
        Ok(coupons.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> DbResult<Option<Coupon>> {
        let coupons = self.coupons.read().await;
        Ok(coupons.iter().find(|c| c.code == code).cloned())
    }

    async fn insert(&self, coupon: &Coupon) -> DbResult<()> {
        let mut coupons = self.coupons.write().await;

        if coupons.iter().any(|c| c.code == coupon.code) {
            return Err(DbError::duplicate("code", &coupon.code));
        }

        debug!(id = %coupon.id, code = %coupon.code, "Inserting coupon (memory)");
        coupons.push(coupon.clone());
        Ok(())
    }

    async fn update(&self, coupon: &Coupon) -> DbResult<()> {
        let mut coupons = self.coupons.write().await;

        if coupons
            .iter()
            .any(|c| c.code == coupon.code && c.id != coupon.id)
        {
            return Err(DbError::duplicate("code", &coupon.code));
        }

        let slot = coupons
            .iter_mut()
            .find(|c| c.id == coupon.id)
            .ok_or_else(|| DbError::not_found("Coupon", &coupon.id))?;

        debug!(id = %coupon.id, "Updating coupon (memory)");
        *slot = coupon.clone();
        Ok(())
    }

    async fn delete(&self, id: &str) -> DbResult<bool> {
        let mut coupons = self.coupons.write().await;
        let before = coupons.len();
        coupons.retain(|c| c.id != id);
        Ok(coupons.len() != before)
    }
}
