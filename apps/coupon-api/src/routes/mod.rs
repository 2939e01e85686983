//! # HTTP Routes
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Router Layout                                 │
//! │                                                                         │
//! │  /health                 → SELECT 1 + migration status                 │
//! │  /coupons, /coupons/{id} → coupon CRUD                                 │
//! │  /api/coupons, …         → same routes under the /api prefix           │
//! │                                                                         │
//! │  Layers: TraceLayer (request logging) → CorsLayer                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod coupons;

use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::ServerSettings;
use crate::response::{Envelope, Reply};
use crate::AppState;

/// Builds the complete application router.
pub fn app(state: AppState, server: &ServerSettings) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(coupons::router())
        .nest("/api", coupons::router())
        .layer(cors_layer(server))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `200 {status: true, message: "ok"}` while the database answers and its
/// schema is current; `503` otherwise.
pub async fn health(State(state): State<AppState>) -> Reply<()> {
    let Some(db) = &state.db else {
        return Reply::ok(Envelope::message(true, "ok"));
    };

    match db.health().await {
        Ok(health) if health.is_healthy() => Reply::ok(Envelope::message(true, "ok")),
        Ok(health) => {
            warn!(
                applied = health.migrations.applied,
                embedded = health.migrations.embedded,
                "Health check failed: migrations pending"
            );
            unavailable()
        }
        Err(e) => {
            warn!(error = %e, "Health check failed: database unavailable");
            unavailable()
        }
    }
}

fn unavailable() -> Reply<()> {
    Reply(
        StatusCode::SERVICE_UNAVAILABLE,
        Envelope::message(false, "database unavailable"),
    )
}

fn cors_layer(server: &ServerSettings) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    if server.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use coupon_db::{CouponStore, Database, DbConfig, MemoryCouponBackend};
    use serde_json::{json, Value};
    use tower::util::ServiceExt; // for `oneshot`

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn memory_app() -> Router {
        let store = CouponStore::new(Arc::new(MemoryCouponBackend::new()));
        app(AppState::new(store), &ServerSettings::default())
    }

    #[tokio::test]
    async fn test_health_ok() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let app = app(AppState::with_database(db), &ServerSettings::default());

        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "status": true, "message": "ok" }));
    }

    #[tokio::test]
    async fn test_health_unavailable_when_pool_closed() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let app = app(AppState::with_database(db.clone()), &ServerSettings::default());
        db.close().await;

        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["status"], false);
    }

    #[tokio::test]
    async fn test_routes_mounted_under_api_prefix() {
        let app = memory_app();

        for uri in ["/coupons", "/api/coupons"] {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            assert_eq!(body_json(response).await, json!({ "status": true, "data": [] }));
        }
    }

    #[tokio::test]
    async fn test_cors_preflight_allowed() {
        let app = memory_app();

        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/coupons")
            .header("origin", "http://localhost:5173")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            HeaderValue::from_static("*")
        );
    }
}
