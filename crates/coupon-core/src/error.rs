//! # Error Types
//!
//! Domain-specific error types for coupon-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  coupon-core errors (this file)                                        │
//! │  ├── ValidationError  - One rule violation on one field                │
//! │  ├── FieldErrors      - field → [ValidationError], returned as DATA    │
//! │  └── CoreError        - Unknown coupon type or status strings          │
//! │                                                                         │
//! │  coupon-db errors (separate crate)                                     │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── StoreError       - Validation | NotFound | Storage                │
//! │                                                                         │
//! │  coupon-api errors (in app)                                            │
//! │  └── ApiError         - What the browser client sees (envelope)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. The Validator never raises for rule violations; it returns FieldErrors
//! 2. Every field is checked, so one response can list every problem
//! 3. Messages are rendered from the variant, never stored as free text

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// A single rule violation on a single field.
///
/// The rendered message uses the human attribute name (`expiry_date` reads as
/// "expiry date").
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Field is missing, null, or an empty string.
    #[error("The {} field is required.", attribute(.field))]
    Required { field: String },

    /// Field is required because `other` is not one of `values`.
    #[error(
        "The {} field is required unless {} is in {}.",
        attribute(.field),
        attribute(.other),
        .values.join(", ")
    )]
    RequiredUnless {
        field: String,
        other: String,
        values: Vec<String>,
    },

    /// Value collides with another record.
    #[error("The {} has already been taken.", attribute(.field))]
    Taken { field: String },

    /// Value is not a string.
    #[error("The {} field must be a string.", attribute(.field))]
    NotString { field: String },

    /// String is longer than the limit.
    #[error("The {} field must not be greater than {max} characters.", attribute(.field))]
    TooLong { field: String, max: usize },

    /// Value is not in the allowed set.
    #[error("The selected {} is invalid.", attribute(.field))]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Value is not numeric.
    #[error("The {} field must be a number.", attribute(.field))]
    NotNumeric { field: String },

    /// Value does not parse as a calendar date.
    #[error("The {} field must be a valid date.", attribute(.field))]
    InvalidDate { field: String },

    /// Date is not strictly after today.
    #[error("The {} field must be a date after today.", attribute(.field))]
    NotAfterToday { field: String },
}

impl ValidationError {
    /// The request field this violation belongs to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::RequiredUnless { field, .. }
            | ValidationError::Taken { field }
            | ValidationError::NotString { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::NotAllowed { field, .. }
            | ValidationError::NotNumeric { field }
            | ValidationError::InvalidDate { field }
            | ValidationError::NotAfterToday { field } => field,
        }
    }
}

fn attribute(field: &str) -> String {
    field.replace('_', " ")
}

// =============================================================================
// Field-Error Map
// =============================================================================

/// Field name → ordered, non-empty list of violations.
///
/// Serializes as `{"code": ["The code has already been taken."], ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<String, Vec<ValidationError>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation under its own field.
    pub fn push(&mut self, error: ValidationError) {
        self.errors
            .entry(error.field().to_string())
            .or_default()
            .push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of fields with at least one violation.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether `field` has any violation.
    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Violations recorded for `field`, in rule order.
    pub fn get(&self, field: &str) -> &[ValidationError] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Rendered messages for `field`.
    pub fn messages(&self, field: &str) -> Vec<String> {
        self.get(field).iter().map(ToString::to_string).collect()
    }

    /// Field names with violations, sorted.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    /// Returns `Ok(value)` when no violation was recorded.
    pub fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationError> for FieldErrors {
    fn from(error: ValidationError) -> Self {
        let mut errors = FieldErrors::new();
        errors.push(error);
        errors
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for error in self.errors.values().flatten() {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{error}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.errors.len()))?;
        for (field, errors) in &self.errors {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            map.serialize_entry(field, &messages)?;
        }
        map.end()
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// String is not one of the coupon types.
    #[error("Unknown coupon type: '{0}'")]
    UnknownCouponType(String),

    /// String is not one of the coupon statuses.
    #[error("Unknown coupon status: '{0}'")]
    UnknownCouponStatus(String),
}

// =============================================================================
// Unit Tests
// =============================================================================
