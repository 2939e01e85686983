//! # Validation Module
//!
//! The Coupon Validator: checks a proposed coupon against the field rules
//! before the store accepts a write.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP (coupon-api)                                            │
//! │  └── Body must be a JSON object → CouponPayload                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Every field checked, all violations collected                     │
//! │  ├── Update mode: rules run on the CANDIDATE record                    │
//! │  │   (supplied fields merged over the stored coupon)                   │
//! │  └── Output: NewCoupon | CouponChanges | FieldErrors                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Store + SQLite                                               │
//! │  ├── Serialized write path (lookup + write are one unit)               │
//! │  └── UNIQUE(code) constraint                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! | field         | create                     | update (if supplied)       |
//! |---------------|----------------------------|----------------------------|
//! | `code`        | required, string, unique, ≤50 | same; own code is not a collision |
//! | `type`        | required, one of 3         | one of 3                   |
//! | `value`       | numeric; required unless free_shipping (on the candidate) | |
//! | `status`      | required, one of 3         | one of 3                   |
//! | `expiry_date` | required, date, > today    | date, > today              |
//!
//! ## Usage
//! ```rust
//! use chrono::NaiveDate;
//! use coupon_core::validation::{validate_create, ValidationContext};
//! use coupon_core::CouponPayload;
//!
//! let payload: CouponPayload = serde_json::from_value(serde_json::json!({
//!     "code": "TEN",
//!     "type": "percentage",
//!     "status": "active",
//!     "expiry_date": "2030-01-01",
//! }))
//! .unwrap();
//!
//! let today = NaiveDate::from_ymd_opt(2029, 1, 1).unwrap();
//! let errors = validate_create(&payload, &ValidationContext::new(today)).unwrap_err();
//! assert_eq!(
//!     errors.messages("value"),
//!     vec!["The value field is required unless type is in free_shipping."]
//! );
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::error::{FieldErrors, ValidationError};
use crate::types::{Coupon, CouponChanges, CouponPayload, CouponStatus, CouponType, NewCoupon};
use crate::MAX_CODE_LENGTH;

/// Result type for single-field checks.
pub type ValidationResult<T> = Result<T, ValidationError>;

const CODE: &str = "code";
const TYPE: &str = "type";
const VALUE: &str = "value";
const STATUS: &str = "status";
const EXPIRY_DATE: &str = "expiry_date";

// =============================================================================
// Context
// =============================================================================

/// Facts from outside the payload that the rules depend on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationContext {
    /// The current date; `expiry_date` must be strictly after it.
    pub today: NaiveDate,

    /// Id of the stored coupon that currently holds the supplied code.
    pub code_owner: Option<String>,
}

impl ValidationContext {
    pub fn new(today: NaiveDate) -> Self {
        ValidationContext {
            today,
            code_owner: None,
        }
    }

    /// Records which coupon owns the supplied code.
    pub fn with_code_owner(mut self, owner: Option<String>) -> Self {
        self.code_owner = owner;
        self
    }
}

// =============================================================================
// Create / Update
// =============================================================================

/// Validates a full field set for creation.
///
/// Returns the typed coupon fields, or every violation found.
/// When the type is `free_shipping` the returned `value` is `None`.
pub fn validate_create(
    payload: &CouponPayload,
    ctx: &ValidationContext,
) -> Result<NewCoupon, FieldErrors> {
    let mut errors = FieldErrors::new();

    let code = collect(
        &mut errors,
        required(CODE, payload.code.as_ref())
            .and_then(|v| validate_code(v, ctx.code_owner.is_some())),
    );
    let coupon_type = collect(
        &mut errors,
        required(TYPE, payload.coupon_type.as_ref())
            .and_then(|v| parse_coupon_type(v).map_err(one)),
    );
    let value = collect(
        &mut errors,
        resolve_value(payload.value.as_ref().map(parse_value), None, coupon_type),
    );
    let status = collect(
        &mut errors,
        required(STATUS, payload.status.as_ref()).and_then(|v| parse_status(v).map_err(one)),
    );
    let expiry_date = collect(
        &mut errors,
        required(EXPIRY_DATE, payload.expiry_date.as_ref())
            .and_then(|v| parse_expiry_date(v, ctx.today).map_err(one)),
    );

    match (code, coupon_type, value, status, expiry_date) {
        (Some(code), Some(coupon_type), Some(value), Some(status), Some(expiry_date))
            if errors.is_empty() =>
        {
            Ok(NewCoupon {
                code,
                coupon_type,
                value,
                status,
                expiry_date,
            })
        }
        _ => Err(errors),
    }
}

/// Validates a partial field set against the stored `current` record.
///
/// Omitted fields keep their stored value. The `value`/`type` rule runs on
/// the candidate record, so switching a free-shipping coupon to a valued
/// type without sending a value is rejected.
pub fn validate_update(
    current: &Coupon,
    payload: &CouponPayload,
    ctx: &ValidationContext,
) -> Result<CouponChanges, FieldErrors> {
    let mut errors = FieldErrors::new();
    let mut changes = CouponChanges::default();

    if let Some(raw) = payload.code.as_ref() {
        let taken = ctx
            .code_owner
            .as_deref()
            .is_some_and(|owner| owner != current.id);
        changes.code = collect(
            &mut errors,
            required(CODE, Some(raw)).and_then(|v| validate_code(v, taken)),
        );
    }

    let mut type_rejected = false;
    if let Some(raw) = payload.coupon_type.as_ref() {
        changes.coupon_type = collect(
            &mut errors,
            required(TYPE, Some(raw)).and_then(|v| parse_coupon_type(v).map_err(one)),
        );
        type_rejected = changes.coupon_type.is_none();
    }
    let effective_type = if type_rejected {
        None
    } else {
        Some(changes.coupon_type.unwrap_or(current.coupon_type))
    };

    let candidate_value = collect(
        &mut errors,
        resolve_value(
            payload.value.as_ref().map(parse_value),
            current.value,
            effective_type,
        ),
    );
    if let Some(value) = candidate_value {
        if value != current.value {
            changes.value = Some(value);
        }
    }

    if let Some(raw) = payload.status.as_ref() {
        changes.status = collect(
            &mut errors,
            required(STATUS, Some(raw)).and_then(|v| parse_status(v).map_err(one)),
        );
    }

    if let Some(raw) = payload.expiry_date.as_ref() {
        changes.expiry_date = collect(
            &mut errors,
            required(EXPIRY_DATE, Some(raw))
                .and_then(|v| parse_expiry_date(v, ctx.today).map_err(one)),
        );
    }

    errors.into_result(|| changes)
}

// =============================================================================
// Field Rules
// =============================================================================

/// Validates a code value. `taken` reports a collision with another record.
///
/// Rule order: unique, string, max length. A non-string stops after the
/// string check.
pub fn validate_code(raw: &Value, taken: bool) -> Result<String, Vec<ValidationError>> {
    let mut violations = Vec::new();
    if taken {
        violations.push(ValidationError::Taken {
            field: CODE.to_string(),
        });
    }

    let Some(code) = raw.as_str().map(str::trim) else {
        violations.push(ValidationError::NotString {
            field: CODE.to_string(),
        });
        return Err(violations);
    };

    if code.chars().count() > MAX_CODE_LENGTH {
        violations.push(ValidationError::TooLong {
            field: CODE.to_string(),
            max: MAX_CODE_LENGTH,
        });
    }

    if violations.is_empty() {
        Ok(code.to_string())
    } else {
        Err(violations)
    }
}

/// Parses a coupon type.
pub fn parse_coupon_type(raw: &Value) -> ValidationResult<CouponType> {
    raw.as_str()
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| ValidationError::NotAllowed {
            field: TYPE.to_string(),
            allowed: CouponType::ALL.iter().map(|t| t.to_string()).collect(),
        })
}

/// Parses a coupon status.
pub fn parse_status(raw: &Value) -> ValidationResult<CouponStatus> {
    raw.as_str()
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| ValidationError::NotAllowed {
            field: STATUS.to_string(),
            allowed: CouponStatus::ALL.iter().map(|s| s.to_string()).collect(),
        })
}

/// Parses a nullable numeric value.
///
/// Accepts JSON numbers and numeric strings. `null` parses to `None`.
pub fn parse_value(raw: &Value) -> ValidationResult<Option<f64>> {
    let not_numeric = || ValidationError::NotNumeric {
        field: VALUE.to_string(),
    };

    match raw {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_f64().map(Some).ok_or_else(not_numeric),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(not_numeric),
        _ => Err(not_numeric()),
    }
}

/// Parses a calendar date and checks it is strictly after `today`.
///
/// Accepted formats: `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`,
/// `YYYY-MM-DDTHH:MM:SS`, RFC 3339.
pub fn parse_expiry_date(raw: &Value, today: NaiveDate) -> ValidationResult<NaiveDate> {
    let date = raw
        .as_str()
        .and_then(|s| parse_calendar_date(s.trim()))
        .ok_or_else(|| ValidationError::InvalidDate {
            field: EXPIRY_DATE.to_string(),
        })?;

    if date <= today {
        return Err(ValidationError::NotAfterToday {
            field: EXPIRY_DATE.to_string(),
        });
    }

    Ok(date)
}

fn parse_calendar_date(s: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        // The calendar date as written, in the value's own offset.
        return Some(dt.date_naive());
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

// =============================================================================
// Helpers
// =============================================================================

/// `Required` when the field is absent, `null`, or a blank string.
fn required<'a>(field: &str, raw: Option<&'a Value>) -> Result<&'a Value, Vec<ValidationError>> {
    match raw {
        None | Some(Value::Null) => Err(vec![missing(field)]),
        Some(Value::String(s)) if s.trim().is_empty() => Err(vec![missing(field)]),
        Some(value) => Ok(value),
    }
}

fn one(error: ValidationError) -> Vec<ValidationError> {
    vec![error]
}

fn missing(field: &str) -> ValidationError {
    ValidationError::Required {
        field: field.to_string(),
    }
}

/// Decides the candidate value.
///
/// `supplied` is the parsed request value (absent = `None`), `stored` the
/// current value on update, `effective_type` the candidate's type (or `None`
/// when the type itself was rejected).
fn resolve_value(
    supplied: Option<ValidationResult<Option<f64>>>,
    stored: Option<f64>,
    effective_type: Option<CouponType>,
) -> Result<Option<f64>, Vec<ValidationError>> {
    let candidate = match supplied {
        Some(Ok(value)) => value,
        Some(Err(e)) => return Err(vec![e]),
        None => stored,
    };

    match effective_type {
        Some(CouponType::FreeShipping) => Ok(None),
        _ if candidate.is_none() => Err(vec![ValidationError::RequiredUnless {
            field: VALUE.to_string(),
            other: TYPE.to_string(),
            values: vec![CouponType::FreeShipping.to_string()],
        }]),
        _ => Ok(candidate),
    }
}

/// Moves violations into `errors`, keeping the success value.
fn collect<T, E>(errors: &mut FieldErrors, result: Result<T, E>) -> Option<T>
where
    E: IntoIterator<Item = ValidationError>,
{
    match result {
        Ok(value) => Some(value),
        Err(violations) => {
            for violation in violations {
                errors.push(violation);
            }
            None
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
