//! HTTP API route definitions.

use axum::{extract::Request, middleware::Next, response::Response, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::cors;
use super::docs::openapi_json;
use super::handlers::{create_user, health, list_users, metrics, AppState};
use crate::metrics as app_metrics;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        // Health endpoint
        .route("/health", get(health))
        // User endpoints
        .route("/api/users", get(list_users).post(create_user))
        // Observability
        .route("/metrics", get(metrics))
        .route("/api-docs/openapi.json", get(openapi_json))
        .with_state(state);

    cors::apply(router)
        .layer(axum::middleware::from_fn(count_requests))
        .layer(TraceLayer::new_for_http())
}

async fn count_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let response = next.run(request).await;
    app_metrics::inc_http_requests(method.as_str(), response.status().as_u16());
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::api::cors::{ALLOW_HEADERS, ALLOW_METHODS, ALLOW_ORIGIN};
    use crate::db::{
        ConnectionManager, ConnectionState, MemoryStoreConfig, MemoryUserStore, PgUserStore,
        UserStore, DEFAULT_RETRY_DELAY,
    };
    use crate::users::NewUser;

    fn memory_router(store: MemoryUserStore) -> Router {
        create_router(AppState::new(Arc::new(store)))
    }

    fn disconnected_router() -> Router {
        let manager = Arc::new(ConnectionManager::new(
            sqlx::postgres::PgConnectOptions::new(),
            DEFAULT_RETRY_DELAY,
        ));
        create_router(AppState::new(Arc::new(PgUserStore::new(manager))))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn assert_cors_headers(response: &axum::response::Response) {
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], ALLOW_ORIGIN);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], ALLOW_HEADERS);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], ALLOW_METHODS);
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/users")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let app = memory_router(MemoryUserStore::new());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_cors_headers(&response);
        assert_eq!(body_json(response).await, json!({"status": "Backend OK"}));
    }

    #[tokio::test]
    async fn health_is_ok_while_database_is_disconnected() {
        let app = disconnected_router();

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn list_while_disconnected_returns_500_with_detail() {
        let app = disconnected_router();

        let response = app
            .oneshot(Request::builder().uri("/api/users").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_cors_headers(&response);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Database error");
        assert_eq!(body["message"], "database connection not established");
    }

    #[tokio::test]
    async fn endpoints_answer_while_connect_loop_retries() {
        let manager = Arc::new(ConnectionManager::new(
            sqlx::postgres::PgConnectOptions::new().host("127.0.0.1").port(1),
            Duration::from_millis(10),
        ));
        let handle = manager.spawn_connect();
        let app = create_router(AppState::new(Arc::new(PgUserStore::new(Arc::clone(&manager)))));

        tokio::time::timeout(Duration::from_secs(10), async {
            while manager.attempts() < 2 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::builder().uri("/api/users").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "Database error");

        let seen = manager.attempts();
        tokio::time::timeout(Duration::from_secs(10), async {
            while manager.attempts() == seen {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
        assert_eq!(manager.state(), ConnectionState::Disconnected);

        handle.abort();
    }

    #[tokio::test]
    async fn options_short_circuits_on_any_path() {
        for uri in ["/api/users", "/health", "/no/such/route"] {
            let app = memory_router(MemoryUserStore::new());
            let response = app
                .oneshot(
                    Request::builder()
                        .method(Method::OPTIONS)
                        .uri(uri)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK, "OPTIONS {uri}");
            assert_cors_headers(&response);
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            assert!(bytes.is_empty());
        }
    }

    #[tokio::test]
    async fn create_then_list_returns_the_new_record() {
        let store = MemoryUserStore::new();
        let app = memory_router(store.clone());

        let response = app
            .clone()
            .oneshot(post_json(r#"{"name":"Ada","email":"ada@example.com"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let created = body_json(response).await;
        assert!(created["id"].is_i64());
        assert_eq!(created["name"], "Ada");
        assert_eq!(created["email"], "ada@example.com");

        let response = app
            .oneshot(Request::builder().uri("/api/users").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([created]));
    }

    #[tokio::test]
    async fn list_never_exceeds_ten_records() {
        let store = MemoryUserStore::new();
        for i in 0..12 {
            store
                .create_user(NewUser::new(format!("user{i}"), format!("u{i}@example.com")))
                .await
                .unwrap();
        }
        let app = memory_router(store);

        let response = app
            .oneshot(Request::builder().uri("/api/users").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body.as_array().map(Vec::len), Some(10));
    }

    #[tokio::test]
    async fn create_with_missing_field_surfaces_storage_error() {
        let store = MemoryUserStore::with_config(MemoryStoreConfig {
            require_fields: true,
            ..Default::default()
        });
        let app = memory_router(store);

        let response = app.oneshot(post_json(r#"{"name":"Ada"}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_cors_headers(&response);
        let body = body_json(response).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn create_passes_missing_fields_through() {
        let store = MemoryUserStore::new();
        let app = memory_router(store.clone());

        let response = app.oneshot(post_json("{}")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["name"], Value::Null);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn create_without_json_content_type_has_no_fields() {
        let store = MemoryUserStore::with_config(MemoryStoreConfig {
            require_fields: true,
            ..Default::default()
        });
        let app = memory_router(store.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/users")
                    .body(Body::from(r#"{"name":"Ada","email":"ada@example.com"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn create_with_unusable_field_types_is_server_error() {
        for body in [
            r#"{"name":42,"email":"a@b.c"}"#,
            r#"{"name":"Ada","email":["x"]}"#,
            r#"{"name":{"first":"Ada"},"email":"a@b.c"}"#,
        ] {
            let store = MemoryUserStore::new();
            let app = memory_router(store.clone());

            let response = app.oneshot(post_json(body)).await.unwrap();

            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{body}");
            assert_cors_headers(&response);
            assert!(body_json(response).await["error"].is_string());
            assert!(store.is_empty());
        }
    }

    #[tokio::test]
    async fn rows_are_returned_with_every_column() {
        let mut extra_columns = serde_json::Map::new();
        extra_columns.insert("created_at".to_string(), json!("2024-01-01T00:00:00"));
        let app = memory_router(MemoryUserStore::with_config(MemoryStoreConfig {
            extra_columns,
            ..Default::default()
        }));

        let response = app
            .clone()
            .oneshot(post_json(r#"{"name":"Ada","email":"ada@example.com"}"#))
            .await
            .unwrap();
        let created = body_json(response).await;
        assert_eq!(created["created_at"], "2024-01-01T00:00:00");

        let response = app
            .oneshot(Request::builder().uri("/api/users").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_json(response).await, json!([created]));
    }

    #[tokio::test]
    async fn create_with_malformed_json_is_bad_request() {
        let app = memory_router(MemoryUserStore::new());

        let response = app.oneshot(post_json("{not json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let app = memory_router(MemoryUserStore::new());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api-docs/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["paths"]["/api/users"].is_object());
    }
}
