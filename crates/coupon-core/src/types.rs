//! # Domain Types
//!
//! Core domain types used throughout the Coupon Manager.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Coupon      │   │   CouponType    │   │  CouponStatus   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  Percentage     │   │  Active         │       │
//! │  │  code (unique)  │   │  FixedAmount    │   │  Inactive       │       │
//! │  │  type / value   │   │  FreeShipping   │   │  Expired        │       │
//! │  │  status         │   └─────────────────┘   └─────────────────┘       │
//! │  │  expiry_date    │                                                    │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  CouponPayload (raw request) ──validate──► NewCoupon | CouponChanges   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! - `id`: UUID v4 - immutable, assigned by the store
//! - `code`: human-readable business key, mutable but unique

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::error::CoreError;

// =============================================================================
// Coupon Type
// =============================================================================

/// The discount mechanism of a coupon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CouponType {
    /// `value` is a percentage off.
    Percentage,
    /// `value` is an absolute amount off.
    FixedAmount,
    /// No `value`; shipping is waived.
    FreeShipping,
}

impl CouponType {
    pub const ALL: [CouponType; 3] = [
        CouponType::Percentage,
        CouponType::FreeShipping,
        CouponType::FixedAmount,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            CouponType::Percentage => "percentage",
            CouponType::FixedAmount => "fixed_amount",
            CouponType::FreeShipping => "free_shipping",
        }
    }

    /// Whether a coupon of this type must carry a `value`.
    pub const fn requires_value(&self) -> bool {
        !matches!(self, CouponType::FreeShipping)
    }
}

impl std::fmt::Display for CouponType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CouponType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CouponType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::UnknownCouponType(s.to_string()))
    }
}

// =============================================================================
// Coupon Status
// =============================================================================

/// Operational status of a coupon.
///
/// Operator-controlled: nothing derives it from `expiry_date` and any
/// status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CouponStatus {
    Active,
    Inactive,
    Expired,
}

impl CouponStatus {
    pub const ALL: [CouponStatus; 3] = [
        CouponStatus::Active,
        CouponStatus::Inactive,
        CouponStatus::Expired,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            CouponStatus::Active => "active",
            CouponStatus::Inactive => "inactive",
            CouponStatus::Expired => "expired",
        }
    }
}

impl std::fmt::Display for CouponStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CouponStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CouponStatus::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::UnknownCouponStatus(s.to_string()))
    }
}

// =============================================================================
// Coupon
// =============================================================================

/// A stored coupon record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Coupon {
    /// Unique identifier (UUID v4), assigned on creation.
    pub id: String,

    /// Business code entered at checkout. Unique, case-sensitive.
    pub code: String,

    /// Discount mechanism.
    #[serde(rename = "type")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "type"))]
    pub coupon_type: CouponType,

    /// Discount amount; `None` for free-shipping coupons.
    pub value: Option<f64>,

    pub status: CouponStatus,

    /// Last day before which the coupon was valid when it was written.
    #[ts(as = "String")]
    pub expiry_date: NaiveDate,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    /// Builds a fresh record from validated fields.
    pub fn from_new(id: String, new: NewCoupon, now: DateTime<Utc>) -> Self {
        Coupon {
            id,
            code: new.code,
            coupon_type: new.coupon_type,
            value: new.value,
            status: new.status,
            expiry_date: new.expiry_date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies validated changes in place and refreshes `updated_at`.
    ///
    /// Fields not carried by `changes` keep their value.
    pub fn apply(&mut self, changes: CouponChanges, now: DateTime<Utc>) {
        if let Some(code) = changes.code {
            self.code = code;
        }
        if let Some(coupon_type) = changes.coupon_type {
            self.coupon_type = coupon_type;
        }
        if let Some(value) = changes.value {
            self.value = value;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(expiry_date) = changes.expiry_date {
            self.expiry_date = expiry_date;
        }
        self.updated_at = now;
    }
}

// =============================================================================
// Request Payload
// =============================================================================

/// Raw coupon fields as sent by a client.
///
/// Each field distinguishes three states:
/// - `None`: key absent from the request
/// - `Some(Value::Null)`: key present with `null`
/// - `Some(value)`: key present with any JSON value (type-checked later)
///
/// Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CouponPayload {
    #[serde(default, deserialize_with = "present")]
    pub code: Option<Value>,

    #[serde(default, rename = "type", deserialize_with = "present")]
    pub coupon_type: Option<Value>,

    #[serde(default, deserialize_with = "present")]
    pub value: Option<Value>,

    #[serde(default, deserialize_with = "present")]
    pub status: Option<Value>,

    #[serde(default, deserialize_with = "present")]
    pub expiry_date: Option<Value>,
}

/// Keeps an explicit `null` as `Some(Value::Null)`.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl CouponPayload {
    /// The trimmed code if the request carries a string code.
    ///
    /// The store uses this to look up the current owner of the code before
    /// validating.
    pub fn code_candidate(&self) -> Option<&str> {
        match &self.code {
            Some(Value::String(code)) => {
                let code = code.trim();
                (!code.is_empty()).then_some(code)
            }
            _ => None,
        }
    }
}

// =============================================================================
// Validated Shapes
// =============================================================================

/// Fields of a coupon that passed create-mode validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCoupon {
    pub code: String,
    pub coupon_type: CouponType,
    pub value: Option<f64>,
    pub status: CouponStatus,
    pub expiry_date: NaiveDate,
}

/// Changes that passed update-mode validation.
///
/// `None` means "leave unchanged". `value` is doubly optional so that a
/// change can clear it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CouponChanges {
    pub code: Option<String>,
    pub coupon_type: Option<CouponType>,
    pub value: Option<Option<f64>>,
    pub status: Option<CouponStatus>,
    pub expiry_date: Option<NaiveDate>,
}

impl CouponChanges {
    pub fn is_empty(&self) -> bool {
        self == &CouponChanges::default()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample_coupon() -> Coupon {
        let now = Utc.with_ymd_and_hms(2026, 1, 10, 9, 30, 0).unwrap();
        Coupon {
            id: "c-1".to_string(),
            code: "SPRING10".to_string(),
            coupon_type: CouponType::Percentage,
            value: Some(10.0),
            status: CouponStatus::Active,
            expiry_date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_coupon_type_parsing() {
        assert_eq!("percentage".parse::<CouponType>().unwrap(), CouponType::Percentage);
        assert_eq!("fixed_amount".parse::<CouponType>().unwrap(), CouponType::FixedAmount);
        assert_eq!("free_shipping".parse::<CouponType>().unwrap(), CouponType::FreeShipping);
        assert!("Percentage".parse::<CouponType>().is_err());
        assert!("bogo".parse::<CouponType>().is_err());
    }

    #[test]
    fn test_coupon_status_parsing() {
        assert_eq!("active".parse::<CouponStatus>().unwrap(), CouponStatus::Active);
        assert_eq!("expired".parse::<CouponStatus>().unwrap(), CouponStatus::Expired);
        assert!("archived".parse::<CouponStatus>().is_err());
    }

    #[test]
    fn test_requires_value() {
        assert!(CouponType::Percentage.requires_value());
        assert!(CouponType::FixedAmount.requires_value());
        assert!(!CouponType::FreeShipping.requires_value());
    }

    #[test]
    fn test_coupon_serializes_type_key() {
        let json = serde_json::to_value(sample_coupon()).unwrap();
        assert_eq!(json["type"], "percentage");
        assert_eq!(json["status"], "active");
        assert_eq!(json["expiry_date"], "2026-04-01");
        assert!(json.get("coupon_type").is_none());
    }

    #[test]
    fn test_payload_distinguishes_absent_and_null() {
        let payload: CouponPayload =
            serde_json::from_value(json!({ "code": "A1", "value": null, "extra": 1 })).unwrap();

        assert_eq!(payload.code, Some(json!("A1")));
        assert_eq!(payload.value, Some(Value::Null));
        assert_eq!(payload.status, None);
        assert_eq!(payload.coupon_type, None);
    }

    #[test]
    fn test_code_candidate_trims() {
        let payload: CouponPayload = serde_json::from_value(json!({ "code": "  A1 " })).unwrap();
        assert_eq!(payload.code_candidate(), Some("A1"));

        let payload: CouponPayload = serde_json::from_value(json!({ "code": 42 })).unwrap();
        assert_eq!(payload.code_candidate(), None);
    }

    #[test]
    fn test_apply_changes_only_supplied_fields() {
        let mut coupon = sample_coupon();
        let before = coupon.clone();
        let later = before.updated_at + chrono::Duration::hours(1);

        coupon.apply(
            CouponChanges {
                status: Some(CouponStatus::Inactive),
                ..Default::default()
            },
            later,
        );

        assert_eq!(coupon.status, CouponStatus::Inactive);
        assert_eq!(coupon.code, before.code);
        assert_eq!(coupon.value, before.value);
        assert_eq!(coupon.expiry_date, before.expiry_date);
        assert_eq!(coupon.created_at, before.created_at);
        assert_eq!(coupon.updated_at, later);
    }

    #[test]
    fn test_apply_can_clear_value() {
        let mut coupon = sample_coupon();
        let now = coupon.updated_at;
        coupon.apply(
            CouponChanges {
                coupon_type: Some(CouponType::FreeShipping),
                value: Some(None),
                ..Default::default()
            },
            now,
        );
        assert_eq!(coupon.coupon_type, CouponType::FreeShipping);
        assert_eq!(coupon.value, None);
    }
}
