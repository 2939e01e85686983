//! # Response Envelope
//!
//! Every response body shares one shape:
//!
//! ```json
//! {
//!   "status": true,
//!   "message": "Coupon created successfully",
//!   "data": { "id": "…", "code": "SAVE10", "type": "percentage", … }
//! }
//! ```
//!
//! Failures set `status: false` and carry `errors` (field → messages) on
//! 422, or `message` + `error` on 500. Absent keys are omitted.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use coupon_core::FieldErrors;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub status: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> Envelope<T> {
    /// `{status: true, data}`
    pub fn data(data: T) -> Self {
        Envelope {
            status: true,
            message: None,
            data: Some(data),
            errors: None,
            error: None,
        }
    }

    /// `{status: true, message, data}`
    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Envelope {
            message: Some(message.into()),
            ..Envelope::data(data)
        }
    }
}

impl Envelope<()> {
    /// `{status, message}` with no data.
    pub fn message(status: bool, message: impl Into<String>) -> Self {
        Envelope {
            status,
            message: Some(message.into()),
            data: None,
            errors: None,
            error: None,
        }
    }

    /// `{status: false, errors}`
    pub fn invalid(errors: FieldErrors) -> Self {
        Envelope {
            status: false,
            message: None,
            data: None,
            errors: Some(errors),
            error: None,
        }
    }

    /// `{status: false, message, error}`
    pub fn failure(message: impl Into<String>, error: impl Into<String>) -> Self {
        Envelope {
            status: false,
            message: Some(message.into()),
            data: None,
            errors: None,
            error: Some(error.into()),
        }
    }
}

/// An envelope paired with its HTTP status.
pub struct Reply<T: Serialize>(pub StatusCode, pub Envelope<T>);

impl<T: Serialize> Reply<T> {
    pub fn ok(envelope: Envelope<T>) -> Self {
        Reply(StatusCode::OK, envelope)
    }

    pub fn created(envelope: Envelope<T>) -> Self {
        Reply(StatusCode::CREATED, envelope)
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        (self.0, Json(self.1)).into_response()
    }
}
