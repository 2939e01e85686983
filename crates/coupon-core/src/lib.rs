//! # coupon-core: Pure Business Logic for the Coupon Manager
//!
//! This crate is the **heart** of the Coupon Manager. It defines what a
//! coupon is and which field combinations are legal, as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Coupon Manager Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Browser Client                               │   │
//! │  │     Coupon list ──► Create form ──► Edit form ──► Delete        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP + JSON envelope                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    coupon-api (axum)                            │   │
//! │  │    GET/POST /coupons, GET/PUT/DELETE /coupons/{id}              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    coupon-db (CouponStore)                      │   │
//! │  │       serialized write path ──► backend (SQLite / memory)       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ calls                                  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ coupon-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌───────────┐  ┌──────────┐   │   │
//! │  │   │   types   │  │ validation │  │   error   │  │  clock   │   │   │
//! │  │   │  Coupon   │  │  create /  │  │ FieldErr- │  │  today() │   │   │
//! │  │   │  Payload  │  │  update    │  │ ors map   │  │          │   │   │
//! │  │   └───────────┘  └────────────┘  └───────────┘  └──────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Coupon, CouponType, CouponStatus, request payloads
//! - [`validation`] - The Coupon Validator (create and update modes)
//! - [`error`] - Validation messages and the field-error map
//! - [`clock`] - Injectable source of "now" and "today"
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use coupon_core::validation::{validate_create, ValidationContext};
//! use coupon_core::CouponPayload;
//!
//! let payload: CouponPayload = serde_json::from_value(serde_json::json!({
//!     "code": "SHIPFREE",
//!     "type": "free_shipping",
//!     "status": "active",
//!     "expiry_date": "2030-01-01",
//! }))
//! .unwrap();
//!
//! let today = NaiveDate::from_ymd_opt(2029, 6, 1).unwrap();
//! let coupon = validate_create(&payload, &ValidationContext::new(today)).unwrap();
//! assert_eq!(coupon.value, None);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod clock;
pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CoreError, FieldErrors, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a coupon code, in characters.
pub const MAX_CODE_LENGTH: usize = 50;
