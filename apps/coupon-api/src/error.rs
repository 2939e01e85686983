//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Coupon API                         │
//! │                                                                         │
//! │  Handler                                                               │
//! │  Result<Reply<T>, ApiError>                                            │
//! │         │                                                               │
//! │         ├── body not a JSON object ──► MalformedBody ──► 422           │
//! │         │                                                               │
//! │         ├── StoreError::Validation ──► Validation ─────► 422 {errors}  │
//! │         │                                                               │
//! │         ├── StoreError::NotFound ────► NotFound ───────► 404           │
//! │         │                                                               │
//! │         └── StoreError::Storage ─────► Storage ────────► 500           │
//! │                                       {message: "Error … coupon",       │
//! │                                        error: detail}                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use coupon_core::FieldErrors;
use coupon_db::StoreError;

use crate::response::Envelope;

/// Error returned from HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The proposed coupon broke field rules.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// No coupon with the requested id.
    #[error("Coupon not found")]
    NotFound,

    /// The request body was not a JSON object.
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    /// Storage fault. `context` names the failed operation.
    #[error("{context}: {detail}")]
    Storage {
        context: &'static str,
        detail: String,
    },
}

impl ApiError {
    /// Converts a store error, using `context` as the 500 message.
    pub fn store(context: &'static str, err: StoreError) -> Self {
        match err {
            StoreError::Validation(errors) => ApiError::Validation(errors),
            StoreError::NotFound(_) => ApiError::NotFound,
            StoreError::Storage(e) => {
                // Log the actual error; the envelope still carries the detail
                tracing::error!(context, error = %e, "Storage fault");
                ApiError::Storage {
                    context,
                    detail: e.to_string(),
                }
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::MalformedBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let envelope = match self {
            ApiError::Validation(errors) => Envelope::invalid(errors),
            ApiError::NotFound => Envelope::message(false, "Coupon not found"),
            ApiError::MalformedBody(_) => Envelope::message(false, "Malformed request body"),
            ApiError::Storage { context, detail } => Envelope::failure(context, detail),
        };
        (status, Json(envelope)).into_response()
    }
}
