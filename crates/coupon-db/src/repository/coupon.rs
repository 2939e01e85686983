//! # Coupon Repository
//!
//! SQLite persistence for coupons.
//!
//! Queries are checked at runtime (`query_as::<_, Coupon>`) so the crate
//! builds without a live `DATABASE_URL`.
//!
//! ## Ordering
//! ```text
//! ORDER BY created_at DESC, rowid DESC
//!          ────────────────  ──────────
//!          newest first      insertion order breaks ties
//! ```

use async_trait::async_trait;
use coupon_core::Coupon;
use sqlx::SqlitePool;
use tracing::debug;

use crate::backend::CouponBackend;
use crate::error::{DbError, DbResult};

const SELECT_COLUMNS: &str = r#"
    SELECT id, code, "type", value, status, expiry_date, created_at, updated_at
    FROM coupons
"#;

/// Repository for coupon database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = SqliteCouponRepository::new(pool);
///
/// let newest = repo.list().await?;
/// let coupon = repo.find_by_code("SAVE10").await?;
/// ```
#[derive(Debug, Clone)]
pub struct SqliteCouponRepository {
    pool: SqlitePool,
}

impl SqliteCouponRepository {
    /// Creates a new SqliteCouponRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteCouponRepository { pool }
    }

    /// Counts stored coupons.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM coupons")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl CouponBackend for SqliteCouponRepository {
    async fn list(&self) -> DbResult<Vec<Coupon>> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY created_at DESC, rowid DESC");

        let coupons = sqlx::query_as::<_, Coupon>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = coupons.len(), "Listed coupons");
        Ok(coupons)
    }

    async fn get(&self, id: &str) -> DbResult<Option<Coupon>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");

        let coupon = sqlx::query_as::<_, Coupon>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(coupon)
    }

    async fn find_by_code(&self, code: &str) -> DbResult<Option<Coupon>> {
        let sql = format!("{SELECT_COLUMNS} WHERE code = ?1");

        let coupon = sqlx::query_as::<_, Coupon>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(coupon)
    }

    async fn insert(&self, coupon: &Coupon) -> DbResult<()> {
        debug!(id = %coupon.id, code = %coupon.code, "Inserting coupon");

        sqlx::query(
            r#"
            INSERT INTO coupons (
                id, code, "type", value, status, expiry_date, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&coupon.id)
        .bind(&coupon.code)
        .bind(coupon.coupon_type)
        .bind(coupon.value)
        .bind(coupon.status)
        .bind(coupon.expiry_date)
        .bind(coupon.created_at)
        .bind(coupon.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| with_value(e.into(), &coupon.code))?;

        Ok(())
    }

    async fn update(&self, coupon: &Coupon) -> DbResult<()> {
        debug!(id = %coupon.id, "Updating coupon");

        let result = sqlx::query(
            r#"
            UPDATE coupons SET
                code = ?2,
                "type" = ?3,
                value = ?4,
                status = ?5,
                expiry_date = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&coupon.id)
        .bind(&coupon.code)
        .bind(coupon.coupon_type)
        .bind(coupon.value)
        .bind(coupon.status)
        .bind(coupon.expiry_date)
        .bind(coupon.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| with_value(e.into(), &coupon.code))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Coupon", &coupon.id));
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> DbResult<bool> {
        debug!(id = %id, "Deleting coupon");

        let result = sqlx::query("DELETE FROM coupons WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Fills in the offending code on a unique violation.
fn with_value(err: DbError, code: &str) -> DbError {
    match err {
        DbError::UniqueViolation { field, .. } => DbError::duplicate(field, code),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use coupon_core::{CouponStatus, CouponType};

    async fn repo() -> SqliteCouponRepository {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.coupons()
    }

    fn coupon(id: &str, code: &str, minute: i64) -> Coupon {
        let at = Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap() + Duration::minutes(minute);
        Coupon {
            id: id.to_string(),
            code: code.to_string(),
            coupon_type: CouponType::Percentage,
            value: Some(15.0),
            status: CouponStatus::Active,
            expiry_date: NaiveDate::from_ymd_opt(2027, 3, 1).unwrap(),
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let repo = repo().await;
        let mut original = coupon("a", "SAVE15", 0);
        original.coupon_type = CouponType::FreeShipping;
        original.value = None;
        original.status = CouponStatus::Inactive;

        repo.insert(&original).await.unwrap();

        let loaded = repo.get("a").await.unwrap().unwrap();
        assert_eq!(loaded, original);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_by_code_is_case_sensitive() {
        let repo = repo().await;
        repo.insert(&coupon("a", "SAVE15", 0)).await.unwrap();

        assert!(repo.find_by_code("SAVE15").await.unwrap().is_some());
        assert!(repo.find_by_code("save15").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_code_is_unique_violation() {
        let repo = repo().await;
        repo.insert(&coupon("a", "SAVE15", 0)).await.unwrap();

        let err = repo.insert(&coupon("b", "SAVE15", 1)).await.unwrap_err();
        match err {
            DbError::UniqueViolation { field, value } => {
                assert_eq!(field, "code");
                assert_eq!(value, "SAVE15");
            }
            other => panic!("expected unique violation, got {other:?}"),
        }
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let repo = repo().await;
        repo.insert(&coupon("old", "OLD", 0)).await.unwrap();
        repo.insert(&coupon("new", "NEW", 10)).await.unwrap();
        repo.insert(&coupon("mid", "MID", 5)).await.unwrap();

        let ids: Vec<String> = repo.list().await.unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn test_list_ties_follow_insertion_order() {
        let repo = repo().await;
        repo.insert(&coupon("first", "FIRST", 0)).await.unwrap();
        repo.insert(&coupon("second", "SECOND", 0)).await.unwrap();

        let ids: Vec<String> = repo.list().await.unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = repo().await;
        let mut stored = coupon("a", "SAVE15", 0);
        repo.insert(&stored).await.unwrap();

        stored.code = "SAVE20".to_string();
        stored.value = Some(20.0);
        stored.updated_at = stored.updated_at + Duration::hours(1);
        repo.update(&stored).await.unwrap();

        let loaded = repo.get("a").await.unwrap().unwrap();
        assert_eq!(loaded.code, "SAVE20");
        assert_eq!(loaded.value, Some(20.0));
        assert_eq!(loaded.created_at, stored.created_at);

        assert!(repo.delete("a").await.unwrap());
        assert!(!repo.delete("a").await.unwrap());
        assert!(repo.get("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let repo = repo().await;
        let err = repo.update(&coupon("ghost", "GHOST", 0)).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
