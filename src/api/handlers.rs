//! HTTP API handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utoipa::ToSchema;

use crate::db::UserStore;
use crate::users::{NewUser, User};

/// Static health payload.
pub const HEALTH_STATUS: &str = "Backend OK";

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// User store on the shared connection.
    pub store: Arc<dyn UserStore>,
    /// Prometheus render handle, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state around a store.
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            store,
            metrics: None,
        }
    }

    /// Attach the Prometheus handle served at `/metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always "Backend OK".
    pub status: String,
}

/// Error body returned when listing fails.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListErrorResponse {
    /// Generic error label.
    pub error: String,
    /// Underlying error detail.
    pub message: String,
}

/// Error body returned when creating fails.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Underlying error detail.
    pub error: String,
}

/// Health check handler - always returns 200, whatever the database state.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is alive", body = HealthResponse))
)]
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: HEALTH_STATUS.to_string(),
    })
}

/// List up to ten users.
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Users", body = Vec<User>),
        (status = 500, description = "Query failed", body = ListErrorResponse)
    )
)]
pub async fn list_users(State(state): State<AppState>) -> Response {
    match state.store.list_users().await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list users");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ListErrorResponse {
                    error: "Database error".to_string(),
                    message: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Insert a user and return the stored row.
///
/// Fields are not validated here; a body sent without a JSON content type is
/// treated as having no fields. Only a body that is not valid JSON syntax is a
/// client error. Well-formed JSON whose fields cannot be used fails like an
/// insert would, with 500.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = NewUser,
    responses(
        (status = 200, description = "Inserted user", body = User),
        (status = 400, description = "Body is not valid JSON", body = ErrorResponse),
        (status = 500, description = "Unusable fields or insert failed", body = ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Response {
    let new_user = match payload {
        Ok(Json(new_user)) => new_user,
        Err(JsonRejection::MissingJsonContentType(_)) => NewUser::default(),
        Err(JsonRejection::JsonDataError(rejection)) => {
            error!(error = %rejection.body_text(), "Unusable user fields");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, rejection.body_text());
        }
        Err(rejection) => {
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    match state.store.create_user(new_user).await {
        Ok(row) => {
            info!(id = %row["id"], "User created");
            Json(row).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create user");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

/// Prometheus exposition.
pub async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
