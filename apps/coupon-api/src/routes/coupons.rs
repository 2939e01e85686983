//! # Coupon Routes
//!
//! ```text
//! GET    /coupons        → list    200
//! POST   /coupons        → create  201 | 422
//! GET    /coupons/{id}   → get     200 | 404
//! PUT    /coupons/{id}   → update  200 | 404 | 422
//! DELETE /coupons/{id}   → delete  200 | 404
//! ```
//!
//! Any storage fault answers 500 with the operation's error message.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::Router;
use coupon_core::{Coupon, CouponPayload};
use serde_json::Value;
use tracing::info;

use crate::error::ApiError;
use crate::response::{Envelope, Reply};
use crate::AppState;

/// Create the coupon API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/coupons", get(list_coupons).post(create_coupon))
        .route(
            "/coupons/{id}",
            get(get_coupon).put(update_coupon).delete(delete_coupon),
        )
}

pub async fn list_coupons(State(state): State<AppState>) -> Result<Reply<Vec<Coupon>>, ApiError> {
    info!("GET /coupons");

    let coupons = state
        .store
        .list()
        .await
        .map_err(|e| ApiError::store("Error retrieving coupons", e))?;

    Ok(Reply::ok(Envelope::data(coupons)))
}

pub async fn create_coupon(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Reply<Coupon>, ApiError> {
    info!("POST /coupons");

    let payload = parse_payload(&body)?;
    let coupon = state
        .store
        .create(&payload)
        .await
        .map_err(|e| ApiError::store("Error creating coupon", e))?;

    Ok(Reply::created(Envelope::with_message(
        "Coupon created successfully",
        coupon,
    )))
}

pub async fn get_coupon(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Reply<Coupon>, ApiError> {
    info!("GET /coupons/{}", id);

    let coupon = state
        .store
        .get(&id)
        .await
        .map_err(|e| ApiError::store("Error retrieving coupon", e))?;

    Ok(Reply::ok(Envelope::data(coupon)))
}

pub async fn update_coupon(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Reply<Coupon>, ApiError> {
    info!("PUT /coupons/{}", id);

    let payload = parse_payload(&body)?;
    let coupon = state
        .store
        .update(&id, &payload)
        .await
        .map_err(|e| ApiError::store("Error updating coupon", e))?;

    Ok(Reply::ok(Envelope::with_message(
        "Coupon updated successfully",
        coupon,
    )))
}

pub async fn delete_coupon(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Reply<()>, ApiError> {
    info!("DELETE /coupons/{}", id);

    state
        .store
        .delete(&id)
        .await
        .map_err(|e| ApiError::store("Error deleting coupon", e))?;

    Ok(Reply::ok(Envelope::message(true, "Coupon deleted successfully")))
}

/// Reads the request body as a coupon field set.
///
/// An empty body is an empty field set; anything other than a JSON object
/// is malformed.
fn parse_payload(body: &[u8]) -> Result<CouponPayload, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CouponPayload::default());
    }

    let value: Value =
        serde_json::from_slice(body).map_err(|e| ApiError::MalformedBody(e.to_string()))?;
    if !value.is_object() {
        return Err(ApiError::MalformedBody("expected a JSON object".to_string()));
    }

    serde_json::from_value(value).map_err(|e| ApiError::MalformedBody(e.to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use chrono::NaiveDate;
    use coupon_core::FixedClock;
    use coupon_db::{CouponStore, Database, DbConfig, MemoryCouponBackend};
    use serde_json::json;
    use tower::util::ServiceExt; // for `oneshot`

    fn setup_test_app() -> Router {
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let store = CouponStore::new(Arc::new(MemoryCouponBackend::new()))
            .with_clock(Arc::new(FixedClock::on(today)));
        router().with_state(AppState::new(store))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn save10() -> Value {
        json!({
            "code": "SAVE10",
            "type": "percentage",
            "value": 10,
            "status": "active",
            "expiry_date": "2026-12-31",
        })
    }

    #[tokio::test]
    async fn test_create_coupon() {
        let app = setup_test_app();

        let (status, body) = send(&app, Method::POST, "/coupons", Some(save10())).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], true);
        assert_eq!(body["message"], "Coupon created successfully");
        assert_eq!(body["data"]["code"], "SAVE10");
        assert_eq!(body["data"]["type"], "percentage");
        assert_eq!(body["data"]["value"], 10.0);
        assert_eq!(body["data"]["expiry_date"], "2026-12-31");
        assert!(body["data"]["id"].is_string());
    }

    #[tokio::test]
    async fn test_create_invalid_returns_field_errors() {
        let app = setup_test_app();
        send(&app, Method::POST, "/coupons", Some(save10())).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/coupons",
            Some(json!({
                "code": "SAVE10",
                "type": "bogo",
                "status": "active",
                "expiry_date": "2026-10-14",
            })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body,
            json!({
                "status": false,
                "errors": {
                    "code": ["The code has already been taken."],
                    "type": ["The selected type is invalid."],
                    "value": ["The value field is required unless type is in free_shipping."],
                    "expiry_date": ["The expiry date field must be a date after today."],
                }
            })
        );
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let app = setup_test_app();

        let (status, body) = send(&app, Method::POST, "/coupons", Some(json!([1, 2, 3]))).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body, json!({ "status": false, "message": "Malformed request body" }));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let app = setup_test_app();
        send(&app, Method::POST, "/coupons", Some(save10())).await;
        let mut second = save10();
        second["code"] = json!("SAVE20");
        send(&app, Method::POST, "/coupons", Some(second)).await;

        let (status, body) = send(&app, Method::GET, "/coupons", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], true);
        let codes: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["code"].as_str().unwrap())
            .collect();
        assert_eq!(codes, vec!["SAVE20", "SAVE10"]);
    }

    #[tokio::test]
    async fn test_get_update_delete_cycle() {
        let app = setup_test_app();
        let (_, created) = send(&app, Method::POST, "/coupons", Some(save10())).await;
        let uri = format!("/coupons/{}", created["data"]["id"].as_str().unwrap());

        let (status, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], created["data"]);

        let (status, body) =
            send(&app, Method::PUT, &uri, Some(json!({ "status": "inactive" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Coupon updated successfully");
        assert_eq!(body["data"]["status"], "inactive");
        assert_eq!(body["data"]["code"], "SAVE10");
        assert_eq!(body["data"]["value"], 10.0);

        let (status, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "status": true, "message": "Coupon deleted successfully" })
        );

        let (status, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "status": false, "message": "Coupon not found" }));
    }

    #[tokio::test]
    async fn test_unknown_id_is_404() {
        let app = setup_test_app();

        for method in [Method::GET, Method::PUT, Method::DELETE] {
            let body = (method == Method::PUT).then(|| json!({ "status": "expired" }));
            let (status, response) = send(&app, method, "/coupons/missing", body).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(response["message"], "Coupon not found");
        }
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_fields() {
        let app = setup_test_app();
        let (_, created) = send(&app, Method::POST, "/coupons", Some(save10())).await;
        let uri = format!("/coupons/{}", created["data"]["id"].as_str().unwrap());

        let (status, body) = send(
            &app,
            Method::PUT,
            &uri,
            Some(json!({ "code": null, "expiry_date": "not a date" })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"]["code"], json!(["The code field is required."]));
        assert_eq!(
            body["errors"]["expiry_date"],
            json!(["The expiry date field must be a valid date."])
        );

        let (_, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(body["data"], created["data"]);
    }

    #[tokio::test]
    async fn test_storage_fault_is_500() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let app = router().with_state(AppState::with_database(db.clone()));
        db.close().await;

        let (status, body) = send(&app, Method::GET, "/coupons", None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], false);
        assert_eq!(body["message"], "Error retrieving coupons");
        assert!(body["error"].is_string());
    }
}
