//! # Coupon Store
//!
//! The authoritative coupon collection: validates proposed writes with the
//! Coupon Validator and persists accepted ones through a [`CouponBackend`].
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      create / update / delete                           │
//! │                                                                         │
//! │  write_lock.lock().await ─────────────────────────────┐                │
//! │       │                                                │                │
//! │       ▼                                                │  one writer    │
//! │  find_by_code(payload.code) → code owner               │  at a time     │
//! │       │                                                │                │
//! │       ▼                                                │                │
//! │  validate_create / validate_update (today = clock)     │                │
//! │       │                                                │                │
//! │       ├── FieldErrors ──► StoreError::Validation       │                │
//! │       ▼                                                │                │
//! │  backend.insert / update / delete                      │                │
//! │       │                                                │                │
//! │       └── UNIQUE violation ──► "code" Taken            │                │
//! │                                                        │                │
//! │  guard dropped ◄───────────────────────────────────────┘                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads (`list`, `get`) never take the lock.

use std::sync::Arc;

use coupon_core::validation::{validate_create, validate_update, ValidationContext};
use coupon_core::{Clock, Coupon, CouponPayload, FieldErrors, SystemClock, ValidationError};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::backend::CouponBackend;
use crate::error::{DbError, StoreError, StoreResult};

/// The Coupon Store.
///
/// ## Usage
/// ```rust,ignore
/// let store = CouponStore::new(Arc::new(MemoryCouponBackend::new()));
///
/// let coupon = store.create(&payload).await?;
/// let same = store.get(&coupon.id).await?;
/// ```
pub struct CouponStore {
    backend: Arc<dyn CouponBackend>,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for CouponStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CouponStore")
            .field("now", &self.clock.now())
            .finish_non_exhaustive()
    }
}

impl CouponStore {
    /// Creates a store over `backend` using the system clock.
    pub fn new(backend: Arc<dyn CouponBackend>) -> Self {
        CouponStore {
            backend,
            clock: Arc::new(SystemClock),
            write_lock: Mutex::new(()),
        }
    }

    /// Replaces the clock that decides "today" and the record timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Every coupon, most recently created first.
    pub async fn list(&self) -> StoreResult<Vec<Coupon>> {
        Ok(self.backend.list().await?)
    }

    /// The coupon with this id.
    pub async fn get(&self, id: &str) -> StoreResult<Coupon> {
        self.backend
            .get(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Validates `payload` in create mode and stores the new coupon.
    ///
    /// The store assigns `id`, `created_at` and `updated_at`.
    pub async fn create(&self, payload: &CouponPayload) -> StoreResult<Coupon> {
        let _guard = self.write_lock.lock().await;

        let ctx = self.context(payload).await?;
        let new = validate_create(payload, &ctx).map_err(|errors| rejected("create", errors))?;

        let coupon = Coupon::from_new(Uuid::new_v4().to_string(), new, self.clock.now());
        self.backend.insert(&coupon).await.map_err(storage)?;

        info!(id = %coupon.id, code = %coupon.code, "Coupon created");
        Ok(coupon)
    }

    /// Validates `payload` in update mode against the stored coupon and
    /// applies the supplied fields.
    ///
    /// Omitted fields keep their value; `updated_at` is always refreshed.
    pub async fn update(&self, id: &str, payload: &CouponPayload) -> StoreResult<Coupon> {
        let _guard = self.write_lock.lock().await;

        let mut coupon = self
            .backend
            .get(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let ctx = self.context(payload).await?;
        let changes =
            validate_update(&coupon, payload, &ctx).map_err(|errors| rejected("update", errors))?;

        coupon.apply(changes, self.clock.now());
        self.backend.update(&coupon).await.map_err(|e| match e {
            DbError::NotFound { .. } => StoreError::NotFound(id.to_string()),
            other => storage(other),
        })?;

        info!(id = %coupon.id, code = %coupon.code, "Coupon updated");
        Ok(coupon)
    }

    /// Permanently removes the coupon.
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;

        if !self.backend.delete(id).await? {
            return Err(StoreError::NotFound(id.to_string()));
        }

        info!(id = %id, "Coupon deleted");
        Ok(())
    }

    async fn context(&self, payload: &CouponPayload) -> StoreResult<ValidationContext> {
        let owner = match payload.code_candidate() {
            Some(code) => self.backend.find_by_code(code).await?.map(|c| c.id),
            None => None,
        };
        Ok(ValidationContext::new(self.clock.today()).with_code_owner(owner))
    }
}

fn rejected(operation: &str, errors: FieldErrors) -> StoreError {
    warn!(
        operation,
        fields = ?errors.fields().collect::<Vec<_>>(),
        "Coupon rejected"
    );
    StoreError::Validation(errors)
}

/// A unique violation that slipped past the lookup is the same failure a
/// sequential caller would have seen.
fn storage(err: DbError) -> StoreError {
    match err {
        DbError::UniqueViolation { ref field, .. } if field == "code" => {
            warn!("Coupon code collided at write");
            StoreError::Validation(FieldErrors::from(ValidationError::Taken {
                field: "code".to_string(),
            }))
        }
        other => StoreError::Storage(other),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
